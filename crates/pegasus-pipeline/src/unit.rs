// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The compilation unit: one project build from paths to identifier list.

use crate::asset::Asset;
use crate::compiler::{
    erase, remove_file_if_exists, AssetCompiler, BuildCache, CompilationStats, CompiledRecord,
    ErasedCompiler,
};
use crate::config::CompilationEnv;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::discovery;
use crate::factory::AssetFactory;
use crate::identifiers;
use crate::registry;
use crate::validation::{self, Candidate};
use anyhow::{Context, Result};
use pegasus_core::{AssetPath, OverrideSet};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::time::{Duration, Instant};

/// What a call to [`CompilationUnit::compile`] produced.
#[derive(Debug)]
pub struct CompilationReport {
    succeeded: bool,
    /// Every warning and error, from loading and compiling.
    pub diagnostics: Vec<Diagnostic>,
    /// Every compiled file, including up-to-date ones.
    pub records: Vec<CompiledRecord>,
    /// Per-branch counters over all compilers.
    pub stats: CompilationStats,
    /// Wall time of the compile step.
    pub elapsed: Duration,
}

impl CompilationReport {
    /// `true` when every compiler succeeded and nothing aborted the run.
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// The warnings of the run.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }
}

/// Owns the factories, compilers and validated assets of one build.
pub struct CompilationUnit {
    env: CompilationEnv,
    factories: Vec<Box<dyn AssetFactory>>,
    compilers: Vec<Box<dyn ErasedCompiler>>,
    assets: Vec<Box<dyn Asset>>,
    diagnostics: Diagnostics,
}

impl CompilationUnit {
    /// Creates a unit without any factory or compiler.
    pub fn new(env: CompilationEnv) -> Self {
        Self {
            env,
            factories: Vec::new(),
            compilers: Vec::new(),
            assets: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Creates a unit with every registered factory and compiler.
    pub fn with_registered(env: CompilationEnv) -> Self {
        let mut unit = Self::new(env);
        unit.factories = registry::factories();
        unit.compilers = registry::compilers();
        unit
    }

    /// The directories of the build.
    pub fn env(&self) -> &CompilationEnv {
        &self.env
    }

    /// Adds a factory.
    pub fn add_factory(&mut self, factory: impl AssetFactory + 'static) -> &mut Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Adds a typed compiler.
    pub fn add_compiler<C: AssetCompiler + 'static>(&mut self, compiler: C) -> &mut Self {
        self.compilers.push(erase(compiler));
        self
    }

    /// Adds an already erased compiler.
    pub fn add_erased_compiler(&mut self, compiler: Box<dyn ErasedCompiler>) -> &mut Self {
        self.compilers.push(compiler);
        self
    }

    /// Replaces the asset set with the validated assets of `project`.
    ///
    /// Ignored paths are removed first; every factory then sees the
    /// remaining paths and only paths claimed exactly once are kept.
    pub fn load_assets(
        &mut self,
        project: impl IntoIterator<Item = AssetPath>,
        overrides: &OverrideSet,
    ) -> &mut Self {
        self.assets.clear();
        self.diagnostics = Diagnostics::new();

        let paths = discovery::resolve_project(project, overrides);
        let mut candidates = Vec::new();
        for factory in &self.factories {
            let produced = factory.create_assets(&paths, overrides);
            log::debug!(
                "CompilationUnit: factory '{}' produced {} candidates.",
                factory.name(),
                produced.len()
            );
            candidates.extend(produced.into_iter().map(|asset| Candidate {
                producer: factory.name().to_string(),
                asset,
            }));
        }

        self.assets = validation::validate(&paths, candidates, &mut self.diagnostics);
        log::info!(
            "CompilationUnit: {} of {} files resolved to assets.",
            self.assets.len(),
            paths.len()
        );
        self
    }

    /// The validated assets, sorted by path.
    pub fn assets(&self) -> impl Iterator<Item = &dyn Asset> {
        self.assets.iter().map(|asset| asset.as_ref())
    }

    /// Warnings raised while loading assets.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.entries()
    }

    /// Compiles every validated asset, then writes the identifier list if
    /// the run succeeded. Compilers and assets are dropped when this returns.
    pub fn compile(mut self) -> CompilationReport {
        let started = Instant::now();
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        let assets = std::mem::take(&mut self.assets);

        let mut batches: Vec<Vec<&dyn Asset>> = vec![Vec::new(); self.compilers.len()];
        for asset in &assets {
            let owners: Vec<usize> = self
                .compilers
                .iter()
                .enumerate()
                .filter(|(_, compiler)| compiler.accepts(asset.as_ref()))
                .map(|(index, _)| index)
                .collect();
            match owners.as_slice() {
                [] => diagnostics.warn(Some(asset.path()), "no compiler accepts this asset"),
                [owner] => batches[*owner].push(asset.as_ref()),
                many => {
                    let names = many
                        .iter()
                        .map(|&index| self.compilers[index].name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    diagnostics.warn(
                        Some(asset.path()),
                        format!("accepted by several compilers: {names}; it is skipped"),
                    );
                }
            }
        }

        let mut succeeded = true;
        let mut records = Vec::new();
        let mut stats = CompilationStats::default();
        for (compiler, batch) in self.compilers.iter_mut().zip(&batches) {
            match compiler.compile(batch, &self.env) {
                Ok(outcome) => {
                    succeeded &= outcome.success;
                    records.extend(outcome.records);
                    diagnostics.extend(outcome.diagnostics);
                    stats += outcome.stats;
                }
                Err(err) => {
                    diagnostics.error(None, format!("{err:#}"));
                    succeeded = false;
                    break;
                }
            }
        }
        drop(batches);
        drop(assets);

        let clashes = shared_targets(&records);
        if clashes.has_errors() {
            succeeded = false;
        }
        diagnostics.extend(clashes);
        if succeeded {
            if let Err(err) = self.write_identifiers(&records) {
                diagnostics.error(None, format!("{err:#}"));
                succeeded = false;
            }
        }

        let elapsed = started.elapsed();
        if succeeded {
            log::info!(
                "CompilationUnit: {} processed, {} copied, {} skipped in {:.2?}.",
                stats.processed,
                stats.copied,
                stats.skipped,
                elapsed
            );
        } else {
            log::error!("CompilationUnit: compilation failed after {:.2?}.", elapsed);
        }

        CompilationReport {
            succeeded,
            diagnostics: diagnostics.into_vec(),
            records,
            stats,
            elapsed,
        }
    }

    fn write_identifiers(&self, records: &[CompiledRecord]) -> Result<()> {
        let Some(path) = &self.env.identifier_file else {
            return Ok(());
        };
        let code = identifiers::generate(records, &self.env.root_namespace);
        let written = identifiers::write_if_changed(path, &code)
            .with_context(|| format!("Failed to write identifier list '{}'", path.display()))?;
        if written {
            log::info!("CompilationUnit: wrote identifier list '{}'.", path.display());
        }
        Ok(())
    }

    /// Removes every compiled file, the temp directory and the identifier
    /// list. Missing files are not errors, so cleaning twice is harmless.
    pub fn clean(&self) -> Result<()> {
        let cache = BuildCache::new(&self.env.temp_dir);
        let stamped = cache.stamps().into_iter().flat_map(|stamp| stamp.outputs);
        let targets = stamped.map(|record| record.target).chain(
            self.assets
                .iter()
                .filter(|asset| asset.create_target_path())
                .map(|asset| asset.target_path()),
        );
        for target in targets {
            let path = self.env.target_path(&target);
            remove_file_if_exists(&path)
                .with_context(|| format!("Failed to remove '{}'", path.display()))?;
        }

        match fs::remove_dir_all(&self.env.temp_dir) {
            Err(err) if err.kind() != ErrorKind::NotFound => {
                return Err(err).with_context(|| {
                    format!("Failed to remove '{}'", self.env.temp_dir.display())
                });
            }
            _ => {}
        }

        if let Some(path) = &self.env.identifier_file {
            remove_file_if_exists(path)
                .with_context(|| format!("Failed to remove '{}'", path.display()))?;
        }

        log::info!(
            "CompilationUnit: cleaned '{}'.",
            self.env.target_dir.display()
        );
        Ok(())
    }
}

/// Reports every target written by more than one source.
fn shared_targets(records: &[CompiledRecord]) -> Diagnostics {
    let mut owners: HashMap<&str, &CompiledRecord> = HashMap::new();
    let mut diagnostics = Diagnostics::new();
    for record in records {
        match owners.entry(record.target.key()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(slot) if slot.get().source != record.source => {
                diagnostics.error(
                    Some(&record.target),
                    format!("written by both '{}' and '{}'", slot.get().source, record.source),
                );
            }
            Entry::Occupied(_) => {}
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompileError, CompileInput, CompiledOutput};
    use crate::factory::has_extension;
    use pegasus_core::AssetType;
    use std::any::Any;
    use std::path::Path;

    struct Note(AssetPath);

    impl Asset for Note {
        fn path(&self) -> &AssetPath {
            &self.0
        }
        fn asset_type(&self) -> AssetType {
            AssetType::EntityTemplate
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct NoteFactory;

    impl AssetFactory for NoteFactory {
        fn name(&self) -> &str {
            "note"
        }

        fn create_assets(
            &self,
            paths: &[AssetPath],
            _overrides: &OverrideSet,
        ) -> Vec<Box<dyn Asset>> {
            paths
                .iter()
                .filter(|p| has_extension(p, &["txt"]))
                .map(|p| Box::new(Note(p.clone())) as Box<dyn Asset>)
                .collect()
        }
    }

    struct NoteCompiler(&'static str);

    impl AssetCompiler for NoteCompiler {
        type Asset = Note;

        fn name(&self) -> &str {
            self.0
        }

        fn process(
            &mut self,
            _asset: &Note,
            input: &CompileInput<'_>,
        ) -> Result<CompiledOutput, CompileError> {
            if input.source.starts_with(b"bad") {
                return Err(CompileError::invalid("bad note"));
            }
            Ok(CompiledOutput::primary(input.source.to_vec()))
        }
    }

    fn env(root: &Path) -> CompilationEnv {
        CompilationEnv::new(root.join("src"), root.join("dst"), root.join("tmp"))
            .with_identifier_file(root.join("ids.rs"))
    }

    fn write(root: &Path, name: &str, contents: &str) -> AssetPath {
        let path = root.join("src").join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        AssetPath::new(name).unwrap()
    }

    fn unit(root: &Path) -> CompilationUnit {
        let mut unit = CompilationUnit::new(env(root));
        unit.add_factory(NoteFactory).add_compiler(NoteCompiler("note"));
        unit
    }

    #[test]
    fn compiles_notes_and_writes_identifiers() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "Notes/Hello.txt", "hello");
        let b = write(dir.path(), "data.bin", "??");

        let mut unit = unit(dir.path());
        unit.load_assets([a, b], &OverrideSet::empty());
        assert_eq!(unit.assets().count(), 1);
        assert_eq!(unit.diagnostics().len(), 1);

        let report = unit.compile();
        assert!(report.succeeded());
        assert_eq!(report.stats.processed, 1);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(
            fs::read(dir.path().join("dst/Notes/Hello.txt.pg")).unwrap(),
            b"hello"
        );
        let ids = fs::read_to_string(dir.path().join("ids.rs")).unwrap();
        assert!(ids.contains("pub const HELLO: AssetId<EntityTemplate>"));
    }

    #[test]
    fn a_failing_asset_fails_the_run_but_not_its_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.txt", "fine");
        let bad = write(dir.path(), "bad.txt", "bad note");

        let mut unit = unit(dir.path());
        unit.load_assets([good, bad], &OverrideSet::empty());
        let report = unit.compile();

        assert!(!report.succeeded());
        assert_eq!(report.stats.processed, 1);
        assert_eq!(report.stats.failed, 1);
        assert!(dir.path().join("dst/good.txt.pg").exists());
        assert!(!dir.path().join("ids.rs").exists());
    }

    #[test]
    fn assets_accepted_by_two_compilers_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let note = write(dir.path(), "a.txt", "a");

        let mut unit = unit(dir.path());
        unit.add_compiler(NoteCompiler("other_note"));
        unit.load_assets([note], &OverrideSet::empty());
        let report = unit.compile();

        assert!(report.succeeded());
        assert!(report.records.is_empty());
        let warning = report.warnings().next().unwrap();
        assert!(warning.message.contains("note, other_note"));
    }

    #[test]
    fn unchanged_sources_are_skipped_and_clean_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let note = write(dir.path(), "a.txt", "a");

        let mut first = unit(dir.path());
        first.load_assets([note.clone()], &OverrideSet::empty());
        assert_eq!(first.compile().stats.processed, 1);

        let mut second = unit(dir.path());
        second.load_assets([note.clone()], &OverrideSet::empty());
        assert_eq!(second.compile().stats.skipped, 1);

        let mut cleaner = unit(dir.path());
        cleaner.load_assets([note], &OverrideSet::empty());
        cleaner.clean().unwrap();
        cleaner.clean().unwrap();
        assert!(!dir.path().join("dst/a.txt.pg").exists());
        assert!(!dir.path().join("tmp").exists());
        assert!(!dir.path().join("ids.rs").exists());
    }

    #[test]
    fn targets_shared_between_sources_are_errors() {
        let record = |source: &str, target: &str| CompiledRecord {
            source: AssetPath::new(source).unwrap(),
            target: AssetPath::new(target).unwrap(),
            asset_type: AssetType::VertexShader,
            identifier: None,
        };

        // One source may confirm the same target twice.
        let same = [record("a.fx", "a.fx.vert.pg"), record("a.fx", "a.fx.vert.pg")];
        assert!(shared_targets(&same).is_empty());

        let clash = [record("a.fx", "a.fx.vert.pg"), record("A.fx.vert", "A.FX.vert.pg")];
        let diagnostics = shared_targets(&clash);
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.entries()[0]
            .message
            .contains("written by both 'a.fx' and 'A.fx.vert'"));
    }
}
