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

use crate::helpers::*;
use anyhow::{Context, Result};
use pegasus_core::FORMAT_VERSION;
use pegasus_pipeline::{CompilationUnit, Project};
use std::path::Path;
use std::time::Instant;

fn load_project(manifest_path: &Path) -> Result<Project> {
    if manifest_path.exists() {
        print_info(&format!(
            "Found '{}'. Loading configuration.",
            manifest_path.display()
        ));
    } else {
        print_info(&format!(
            "No '{}' found. Using default configuration.",
            manifest_path.display()
        ));
    }
    Project::load(manifest_path)
        .with_context(|| format!("Failed to load project '{}'", manifest_path.display()))
}

pub fn compile(manifest_path: &Path) -> Result<()> {
    print_task_start("Compiling Assets", HAMMER, BLUE);
    let project = load_project(manifest_path)?;
    print_info(&format!(
        "{} source files, container format v{}",
        project.paths.len(),
        FORMAT_VERSION
    ));

    let mut unit = CompilationUnit::with_registered(project.env);
    unit.load_assets(project.paths, &project.overrides);
    let report = unit.compile();

    for diagnostic in &report.diagnostics {
        print_diagnostic(diagnostic);
    }
    println!(
        "{}📦 Assets:{} {} processed, {} copied from cache, {} up to date, {} failed",
        BOLD,
        RESET,
        report.stats.processed,
        report.stats.copied,
        report.stats.skipped,
        report.stats.failed
    );
    print_timing("Compile time", report.elapsed);

    if !report.succeeded() {
        print_error("Asset compilation failed.");
        anyhow::bail!("asset compilation failed");
    }
    print_success(&format!("Compiled {} files.", report.records.len()));
    Ok(())
}

pub fn clean(manifest_path: &Path) -> Result<()> {
    print_task_start("Cleaning Assets", BROOM, MAGENTA);
    let started = Instant::now();
    let project = load_project(manifest_path)?;
    let target_dir = project.env.target_dir.clone();

    let mut unit = CompilationUnit::with_registered(project.env);
    unit.load_assets(project.paths, &project.overrides);
    if let Err(err) = unit.clean() {
        print_error(&format!("{err:#}"));
        return Err(err);
    }

    print_timing("Clean time", started.elapsed());
    print_success(&format!("Cleaned '{}'.", target_dir.display()));
    Ok(())
}

pub fn list(manifest_path: &Path) -> Result<()> {
    print_task_start("Listing Assets", MAGNIFIER, CYAN);
    let project = load_project(manifest_path)?;
    let total = project.paths.len();

    let mut unit = CompilationUnit::with_registered(project.env);
    unit.load_assets(project.paths, &project.overrides);

    for asset in unit.assets() {
        let identifier = asset
            .identifier()
            .map(|id| format!(" as {}", id.name))
            .unwrap_or_default();
        println!(
            "  {}{}{} {} ({}){}",
            CYAN,
            GEAR,
            RESET,
            asset.path(),
            asset.asset_type(),
            identifier
        );
    }
    for diagnostic in unit.diagnostics() {
        print_diagnostic(diagnostic);
    }

    print_success(&format!(
        "{} of {} files resolve to assets.",
        unit.assets().count(),
        total
    ));
    Ok(())
}
