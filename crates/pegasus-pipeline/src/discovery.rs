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

//! Finding source assets and applying `ignore` overrides.

use crate::config::ConfigError;
use pegasus_core::{AssetPath, OverrideSet};
use std::collections::HashSet;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Recursively finds all files under `root`, as sorted asset paths.
///
/// Hidden files and directories are skipped. A missing root yields an empty
/// list.
pub fn scan_directory(root: &Path) -> Result<Vec<AssetPath>, ConfigError> {
    if !root.exists() {
        log::warn!(
            "Discovery: source directory '{}' does not exist.",
            root.display()
        );
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry.map_err(|source| ConfigError::Scan {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path());
        paths.push(AssetPath::from_relative(relative)?);
    }

    paths.sort();
    log::debug!(
        "Discovery: found {} files under '{}'.",
        paths.len(),
        root.display()
    );
    Ok(paths)
}

/// Builds the project list: every candidate not matched by an `ignore`
/// override, with case-insensitive duplicates collapsed to their first
/// occurrence.
pub fn resolve_project(
    candidates: impl IntoIterator<Item = AssetPath>,
    overrides: &OverrideSet,
) -> Vec<AssetPath> {
    let mut seen = HashSet::new();
    let mut project = Vec::new();

    for path in candidates {
        if !seen.insert(path.key().to_string()) {
            log::trace!("Discovery: '{path}' is listed more than once.");
            continue;
        }
        if overrides.is_ignored(&path) {
            log::debug!("Discovery: '{path}' is ignored by an override.");
            continue;
        }
        project.push(path);
    }

    project
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegasus_core::AssetOverride;
    use std::fs;

    fn paths(list: &[&str]) -> Vec<AssetPath> {
        list.iter().map(|p| AssetPath::new(p).unwrap()).collect()
    }

    #[test]
    fn ignore_overrides_are_case_insensitive() {
        let overrides = OverrideSet::new([AssetOverride::ignore("textures/*.PSD")]).unwrap();
        let project = resolve_project(
            paths(&["Textures/Sun.png", "Textures/Sun.psd", "TEXTURES/moon.Psd"]),
            &overrides,
        );
        assert_eq!(project, paths(&["Textures/Sun.png"]));

        let overrides = OverrideSet::new([AssetOverride::ignore("Ä/*.png")]).unwrap();
        let project = resolve_project(paths(&["ä/x.png", "Ä/Y.PNG", "a/x.png"]), &overrides);
        assert_eq!(project, paths(&["a/x.png"]));
    }

    #[test]
    fn duplicate_ignores_and_duplicate_paths_collapse() {
        let overrides = OverrideSet::new([
            AssetOverride::ignore("a.txt"),
            AssetOverride::ignore("A.TXT"),
        ])
        .unwrap();
        let project = resolve_project(paths(&["a.txt", "b.txt", "B.txt"]), &overrides);
        assert_eq!(project.len(), 1);
        assert_eq!(project[0].as_str(), "b.txt");
    }

    #[test]
    fn scanning_skips_hidden_entries_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Textures")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join("Textures/Sun.png"), b"").unwrap();
        fs::write(root.join("Font.fnt"), b"").unwrap();
        fs::write(root.join(".cache/junk.bin"), b"").unwrap();
        fs::write(root.join("Textures/.keep"), b"").unwrap();

        let found = scan_directory(root).unwrap();
        assert_eq!(found, paths(&["Font.fnt", "Textures/Sun.png"]));
    }

    #[test]
    fn missing_directories_scan_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_directory(&dir.path().join("nope")).unwrap().is_empty());
    }
}
