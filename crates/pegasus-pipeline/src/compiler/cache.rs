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

//! Stamps and cached artifacts in the temp directory.
//!
//! Layout:
//!
//! ```text
//! <temp>/stamps/<source path>.stamp   fingerprint + records of the last build
//! <temp>/cache/<fingerprint>.bin      the compiled output for a fingerprint
//! ```

use super::{CompiledOutput, CompiledRecord};
use crate::asset::Asset;
use anyhow::{Context, Result};
use pegasus_core::{AssetPath, FORMAT_VERSION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const STAMP_EXTENSION: &str = "stamp";

/// What happens to an asset during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompilationAction {
    /// The outputs are up to date.
    Skip,
    /// The outputs are restored from a cached artifact.
    Copy,
    /// The compiler runs.
    Process,
}

/// A BLAKE3 digest over everything that determines a compiled output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hashes the inputs of one compilation.
    pub fn compute(
        compiler: &str,
        asset: &dyn Asset,
        source: &[u8],
        dependencies: &[(AssetPath, Vec<u8>)],
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&FORMAT_VERSION.to_le_bytes());
        update_field(&mut hasher, compiler.as_bytes());
        hasher.update(&[asset.asset_type().tag()]);
        update_field(&mut hasher, asset.settings_key().as_bytes());
        update_field(&mut hasher, asset.path().key().as_bytes());
        update_field(&mut hasher, source);
        for (path, bytes) in dependencies {
            update_field(&mut hasher, path.key().as_bytes());
            update_field(&mut hasher, bytes);
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// The digest as lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Length prefixes keep adjacent fields from running into each other.
fn update_field(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// The record of the last successful build of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    /// Fingerprint of the inputs of that build.
    pub fingerprint: Fingerprint,
    /// Every file the build wrote.
    pub outputs: Vec<CompiledRecord>,
}

/// Access to the stamps and artifacts under a temp directory.
#[derive(Debug, Clone)]
pub struct BuildCache {
    stamps_dir: PathBuf,
    artifacts_dir: PathBuf,
}

impl BuildCache {
    /// Creates a cache rooted at `temp_dir`. Nothing is touched on disk.
    pub fn new(temp_dir: &Path) -> Self {
        Self {
            stamps_dir: temp_dir.join("stamps"),
            artifacts_dir: temp_dir.join("cache"),
        }
    }

    fn stamp_path(&self, source: &AssetPath) -> PathBuf {
        source
            .with_appended_extension(STAMP_EXTENSION)
            .to_path(&self.stamps_dir)
    }

    fn artifact_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.artifacts_dir.join(format!("{}.bin", fingerprint.as_str()))
    }

    /// Reads the stamp of an asset. Unreadable stamps count as missing.
    pub fn read_stamp(&self, source: &AssetPath) -> Option<Stamp> {
        let path = self.stamp_path(source);
        let bytes = fs::read(&path).ok()?;
        match decode(&bytes) {
            Ok(stamp) => Some(stamp),
            Err(err) => {
                log::debug!("BuildCache: ignoring stamp '{}': {err:#}", path.display());
                None
            }
        }
    }

    /// Writes the stamp of an asset.
    pub fn write_stamp(&self, source: &AssetPath, stamp: &Stamp) -> Result<()> {
        write_file(&self.stamp_path(source), &encode(stamp)?)
    }

    /// Reads the artifact stored for a fingerprint. Unreadable artifacts
    /// count as missing.
    pub fn read_artifact(&self, fingerprint: &Fingerprint) -> Option<CompiledOutput> {
        let path = self.artifact_path(fingerprint);
        let bytes = fs::read(&path).ok()?;
        match decode(&bytes) {
            Ok(output) => Some(output),
            Err(err) => {
                log::debug!(
                    "BuildCache: ignoring artifact '{}': {err:#}",
                    path.display()
                );
                None
            }
        }
    }

    /// Stores the artifact for a fingerprint.
    pub fn write_artifact(&self, fingerprint: &Fingerprint, output: &CompiledOutput) -> Result<()> {
        write_file(&self.artifact_path(fingerprint), &encode(output)?)
    }

    /// Every readable stamp.
    pub fn stamps(&self) -> Vec<Stamp> {
        if !self.stamps_dir.exists() {
            return Vec::new();
        }
        WalkDir::new(&self.stamps_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let bytes = fs::read(entry.path()).ok()?;
                decode(&bytes).ok()
            })
            .collect()
    }
}

/// Decides what a build does with an asset given its previous stamp.
pub fn decide(
    stamp: Option<&Stamp>,
    fingerprint: &Fingerprint,
    target_dir: &Path,
    cache: &BuildCache,
) -> CompilationAction {
    let up_to_date = stamp.is_some_and(|stamp| {
        &stamp.fingerprint == fingerprint
            && stamp
                .outputs
                .iter()
                .all(|record| record.target.to_path(target_dir).is_file())
    });
    if up_to_date {
        CompilationAction::Skip
    } else if cache.artifact_path(fingerprint).is_file() {
        CompilationAction::Copy
    } else {
        CompilationAction::Process
    }
}

/// Removes a file, treating a missing file as success.
pub fn remove_file_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Writes a file, creating its parent directories.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write '{}'", path.display()))
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .context("Failed to serialize build record")
}

fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .context("Failed to deserialize build record")?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegasus_core::AssetType;
    use std::any::Any;

    struct Stub {
        path: AssetPath,
        settings: &'static str,
    }

    impl Asset for Stub {
        fn path(&self) -> &AssetPath {
            &self.path
        }
        fn asset_type(&self) -> AssetType {
            AssetType::Texture2D
        }
        fn settings_key(&self) -> String {
            self.settings.to_string()
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn stub(settings: &'static str) -> Stub {
        Stub {
            path: AssetPath::new("Textures/Sun.png").unwrap(),
            settings,
        }
    }

    #[test]
    fn fingerprints_track_every_input() {
        let deps = vec![(AssetPath::new("a.png").unwrap(), vec![1])];
        let base = Fingerprint::compute("texture", &stub("m=1"), b"src", &deps);

        assert_eq!(base, Fingerprint::compute("texture", &stub("m=1"), b"src", &deps));
        assert_ne!(base, Fingerprint::compute("cube_map", &stub("m=1"), b"src", &deps));
        assert_ne!(base, Fingerprint::compute("texture", &stub("m=0"), b"src", &deps));
        assert_ne!(base, Fingerprint::compute("texture", &stub("m=1"), b"src2", &deps));
        assert_ne!(base, Fingerprint::compute("texture", &stub("m=1"), b"src", &[]));
        assert_eq!(base.as_str().len(), 64);
    }

    #[test]
    fn decisions_follow_stamps_and_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(temp.path());
        let source = AssetPath::new("Textures/Sun.png").unwrap();
        let fingerprint = Fingerprint::compute("texture", &stub(""), b"src", &[]);

        assert_eq!(
            decide(None, &fingerprint, target.path(), &cache),
            CompilationAction::Process
        );

        cache
            .write_artifact(&fingerprint, &CompiledOutput::primary(vec![1, 2]))
            .unwrap();
        assert_eq!(
            decide(None, &fingerprint, target.path(), &cache),
            CompilationAction::Copy
        );

        let record = CompiledRecord {
            source: source.clone(),
            target: AssetPath::new("Textures/Sun.png.pg").unwrap(),
            asset_type: AssetType::Texture2D,
            identifier: None,
        };
        let stamp = Stamp {
            fingerprint: fingerprint.clone(),
            outputs: vec![record.clone()],
        };
        cache.write_stamp(&source, &stamp).unwrap();
        assert_eq!(cache.read_stamp(&source), Some(stamp.clone()));

        // Stamp matches but the output is missing.
        assert_eq!(
            decide(Some(&stamp), &fingerprint, target.path(), &cache),
            CompilationAction::Copy
        );

        write_file(&record.target.to_path(target.path()), b"x").unwrap();
        assert_eq!(
            decide(Some(&stamp), &fingerprint, target.path(), &cache),
            CompilationAction::Skip
        );
        assert_eq!(cache.stamps(), vec![stamp]);
        assert_eq!(
            cache.read_artifact(&fingerprint),
            Some(CompiledOutput::primary(vec![1, 2]))
        );
    }

    #[test]
    fn corrupt_stamps_are_ignored() {
        let temp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(temp.path());
        let source = AssetPath::new("a.png").unwrap();
        write_file(&temp.path().join("stamps/a.png.stamp"), &[0xFF; 3]).unwrap();
        assert!(cache.read_stamp(&source).is_none());
        assert!(cache.stamps().is_empty());
    }

    #[test]
    fn removing_missing_files_is_not_an_error() {
        let temp = tempfile::tempdir().unwrap();
        assert!(remove_file_if_exists(&temp.path().join("missing")).is_ok());
    }
}
