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

//! # Pegasus Pipeline
//!
//! Offline compilation of source assets into the binary container format of
//! [`pegasus_core`].
//!
//! A build runs in four stages:
//! 1. The project list is read from the manifest or discovered on disk, and
//!    ignored paths are removed.
//! 2. Every [`AssetFactory`] turns the paths it recognises into assets.
//!    Paths claimed by no factory or by several are skipped with a warning.
//! 3. Every [`compiler::AssetCompiler`] compiles its assets, skipping the ones
//!    whose fingerprint is unchanged.
//! 4. On success, a Rust identifier list of all compiled assets is written.

pub mod asset;
pub mod assets;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod factory;
pub mod identifiers;
pub mod registry;
pub mod unit;
pub mod validation;

pub use asset::Asset;
pub use compiler::{
    erase, AssetCompiler, CompileError, CompileInput, CompiledOutput, ErasedCompiler,
};
pub use config::{AssetManifest, CompilationEnv, ConfigError, Project};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use factory::AssetFactory;
pub use unit::{CompilationReport, CompilationUnit};

use anyhow::{Context, Result};
use std::path::Path;

/// Builds the project described by `manifest_path` with every registered
/// factory and compiler.
pub fn compile_manifest(manifest_path: &Path) -> Result<CompilationReport> {
    let project = Project::load(manifest_path)
        .with_context(|| format!("Failed to load project '{}'", manifest_path.display()))?;
    let mut unit = CompilationUnit::with_registered(project.env);
    unit.load_assets(project.paths, &project.overrides);
    Ok(unit.compile())
}

/// Builds the project described by `manifest_path`. Returns `true` when every
/// compiler succeeded.
pub fn compile(manifest_path: &Path) -> bool {
    match compile_manifest(manifest_path) {
        Ok(report) => report.succeeded(),
        Err(err) => {
            log::error!("{err:#}");
            false
        }
    }
}

/// Removes every output of the project described by `manifest_path`.
pub fn clean(manifest_path: &Path) -> Result<()> {
    let project = Project::load(manifest_path)
        .with_context(|| format!("Failed to load project '{}'", manifest_path.display()))?;
    let mut unit = CompilationUnit::with_registered(project.env);
    unit.load_assets(project.paths, &project.overrides);
    unit.clean()
}
