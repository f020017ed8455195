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

use super::{
    decide, remove_file_if_exists, write_file, AssetCompiler, BuildCache, CompilationAction,
    CompileError, CompileInput, CompiledOutput, CompiledRecord, Fingerprint, Stamp,
};
use crate::asset::Asset;
use crate::config::CompilationEnv;
use crate::diagnostics::Diagnostics;
use anyhow::{Context, Result};
use pegasus_core::AssetPath;
use std::fs;
use std::ops::AddAssign;

/// How many assets went through each branch of the build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompilationStats {
    /// Assets whose outputs were already up to date.
    pub skipped: usize,
    /// Assets restored from the artifact cache.
    pub copied: usize,
    /// Assets the compiler processed.
    pub processed: usize,
    /// Assets that failed to compile.
    pub failed: usize,
}

impl CompilationStats {
    fn record(&mut self, action: CompilationAction) {
        match action {
            CompilationAction::Skip => self.skipped += 1,
            CompilationAction::Copy => self.copied += 1,
            CompilationAction::Process => self.processed += 1,
        }
    }
}

impl AddAssign for CompilationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.skipped += rhs.skipped;
        self.copied += rhs.copied;
        self.processed += rhs.processed;
        self.failed += rhs.failed;
    }
}

/// The result of running one compiler over its assets.
#[derive(Debug, Default)]
pub struct CompilerOutcome {
    /// `false` as soon as one asset failed.
    pub success: bool,
    /// Files written or confirmed up to date.
    pub records: Vec<CompiledRecord>,
    /// Per-asset failures.
    pub diagnostics: Diagnostics,
    /// Per-branch counters.
    pub stats: CompilationStats,
}

/// The object-safe face of an [`AssetCompiler`].
pub trait ErasedCompiler: Send {
    /// The compiler's name.
    fn name(&self) -> &str;

    /// Whether the asset is of the type this compiler handles.
    fn accepts(&self, asset: &dyn Asset) -> bool;

    /// Compiles every accepted asset of `assets`.
    ///
    /// Per-asset failures end up in the outcome. An `Err` means the build
    /// environment itself is broken and the run must stop.
    fn compile(&mut self, assets: &[&dyn Asset], env: &CompilationEnv) -> Result<CompilerOutcome>;
}

/// A "wrapper" that takes a typed `AssetCompiler` and implements `ErasedCompiler`.
struct CompilerAdapter<C: AssetCompiler>(C);

/// Wraps a typed compiler so the compilation unit can drive it.
pub fn erase<C: AssetCompiler + 'static>(compiler: C) -> Box<dyn ErasedCompiler> {
    Box::new(CompilerAdapter(compiler))
}

impl<C: AssetCompiler> CompilerAdapter<C> {
    fn read_source(&self, path: &AssetPath, env: &CompilationEnv) -> Result<Vec<u8>, CompileError> {
        let file = env.source_path(path);
        fs::read(&file).map_err(|source| CompileError::Io { path: file, source })
    }

    /// Compiles one asset. The outer error aborts the run, the inner one
    /// only fails this asset.
    fn compile_one(
        &mut self,
        asset: &C::Asset,
        env: &CompilationEnv,
        cache: &BuildCache,
    ) -> Result<Result<(CompilationAction, Vec<CompiledRecord>), CompileError>> {
        let source = match self.read_source(asset.path(), env) {
            Ok(bytes) => bytes,
            Err(err) => return Ok(Err(err)),
        };
        let dependencies = match self.read_dependencies(asset, &source, env) {
            Ok(deps) => deps,
            Err(err) => return Ok(Err(err)),
        };

        let fingerprint = Fingerprint::compute(self.0.name(), asset, &source, &dependencies);
        let previous = cache.read_stamp(asset.path());
        let mut action = decide(previous.as_ref(), &fingerprint, &env.target_dir, cache);
        log::trace!("{}: {:?} '{}'", self.0.name(), action, asset.path());

        if action == CompilationAction::Skip {
            let outputs = previous.map(|stamp| stamp.outputs).unwrap_or_default();
            return Ok(Ok((action, outputs)));
        }

        let mut output = None;
        if action == CompilationAction::Copy {
            output = cache.read_artifact(&fingerprint);
            if output.is_none() {
                action = CompilationAction::Process;
            }
        }
        let output = match output {
            Some(output) => output,
            None => {
                let input = CompileInput {
                    source: &source,
                    dependencies: &dependencies,
                };
                let output = match self.0.process(asset, &input) {
                    Ok(output) => output,
                    Err(err) => return Ok(Err(err)),
                };
                cache.write_artifact(&fingerprint, &output)?;
                output
            }
        };

        let records = write_outputs(asset, &output, env)?;
        if let Some(previous) = previous {
            remove_stale_outputs(&previous.outputs, &records, env)?;
        }
        cache.write_stamp(
            asset.path(),
            &Stamp {
                fingerprint,
                outputs: records.clone(),
            },
        )?;
        Ok(Ok((action, records)))
    }

    fn read_dependencies(
        &self,
        asset: &C::Asset,
        source: &[u8],
        env: &CompilationEnv,
    ) -> Result<Vec<(AssetPath, Vec<u8>)>, CompileError> {
        self.0
            .dependencies(asset, source)?
            .into_iter()
            .map(|path| {
                let bytes = self.read_source(&path, env)?;
                Ok((path, bytes))
            })
            .collect()
    }
}

fn write_outputs(
    asset: &dyn Asset,
    output: &CompiledOutput,
    env: &CompilationEnv,
) -> Result<Vec<CompiledRecord>> {
    let mut records = Vec::with_capacity(output.derived.len() + 1);

    if asset.create_target_path() {
        let target = asset.target_path();
        write_file(&env.target_path(&target), &output.bytes)?;
        records.push(CompiledRecord {
            source: asset.path().clone(),
            target,
            asset_type: asset.asset_type(),
            identifier: asset.identifier(),
        });
    }

    for derived in &output.derived {
        let target = derived.target_path();
        write_file(&env.target_path(&target), &derived.bytes)?;
        records.push(CompiledRecord {
            source: asset.path().clone(),
            target,
            asset_type: derived.asset_type,
            identifier: derived.identifier.clone(),
        });
    }

    Ok(records)
}

fn remove_stale_outputs(
    previous: &[CompiledRecord],
    current: &[CompiledRecord],
    env: &CompilationEnv,
) -> Result<()> {
    for record in previous {
        if current.iter().all(|r| r.target != record.target) {
            let path = env.target_path(&record.target);
            log::debug!("Removing stale output '{}'", path.display());
            remove_file_if_exists(&path)
                .with_context(|| format!("Failed to remove '{}'", path.display()))?;
        }
    }
    Ok(())
}

impl<C: AssetCompiler> ErasedCompiler for CompilerAdapter<C> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn accepts(&self, asset: &dyn Asset) -> bool {
        asset.as_any().is::<C::Asset>()
    }

    fn compile(&mut self, assets: &[&dyn Asset], env: &CompilationEnv) -> Result<CompilerOutcome> {
        let cache = BuildCache::new(&env.temp_dir);
        let mut outcome = CompilerOutcome {
            success: true,
            ..CompilerOutcome::default()
        };

        for asset in assets {
            let Some(typed) = asset.as_any().downcast_ref::<C::Asset>() else {
                continue;
            };

            let result = self.compile_one(typed, env, &cache).with_context(|| {
                format!("{} aborted while compiling '{}'", self.name(), asset.path())
            })?;

            match result {
                Ok((action, records)) => {
                    outcome.stats.record(action);
                    outcome.records.extend(records);
                }
                Err(err) => {
                    outcome.success = false;
                    outcome.stats.failed += 1;
                    outcome.diagnostics.error(
                        Some(asset.path()),
                        format!("{} failed: {}", self.name(), err.chain()),
                    );
                }
            }
        }

        log::debug!(
            "{}: {} processed, {} copied, {} skipped, {} failed.",
            self.name(),
            outcome.stats.processed,
            outcome.stats.copied,
            outcome.stats.skipped,
            outcome.stats.failed
        );
        Ok(outcome)
    }
}
