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

//! The `Assets.toml` project manifest and the directories derived from it.

use crate::discovery;
use pegasus_core::asset::PathError;
use pegasus_core::{AssetOverride, AssetPath, OverrideError, OverrideSet};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the manifest looked up by the command line tools.
pub const DEFAULT_MANIFEST: &str = "Assets.toml";

/// An error raised while loading a project.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The manifest exists but could not be read.
    #[error("failed to read manifest '{path}'")]
    Io {
        /// The manifest path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The manifest is not valid TOML or has unknown fields.
    #[error("failed to parse manifest '{path}'")]
    Parse {
        /// The manifest path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: toml::de::Error,
    },
    /// An explicit asset entry is not a valid relative path.
    #[error("invalid asset entry in manifest")]
    InvalidPath(#[from] PathError),
    /// An override pattern is invalid.
    #[error("invalid override declaration")]
    Override(#[from] OverrideError),
    /// The source directory could not be walked.
    #[error("failed to scan source directory '{path}'")]
    Scan {
        /// The directory being scanned.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: walkdir::Error,
    },
}

/// Represents the structure of the `Assets.toml` manifest file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetManifest {
    /// Directory holding the source assets.
    pub source_directory: PathBuf,
    /// Directory receiving compiled containers.
    pub target_directory: PathBuf,
    /// Directory holding stamps and cached artifacts.
    pub temp_directory: PathBuf,
    /// The generated identifier list.
    pub identifier_file: PathBuf,
    /// Module path the identifier list is rooted under, e.g. `game::assets`.
    pub root_namespace: String,
    /// Explicit project list. The source directory is scanned when absent.
    pub assets: Option<Vec<String>>,
    /// Override declarations, applied in order.
    pub overrides: Vec<AssetOverride>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            source_directory: PathBuf::from("assets"),
            target_directory: PathBuf::from(".dist/assets"),
            temp_directory: PathBuf::from(".dist/obj/assets"),
            identifier_file: PathBuf::from(".dist/generated/asset_ids.rs"),
            root_namespace: "assets".to_string(),
            assets: None,
            overrides: Vec::new(),
        }
    }
}

impl AssetManifest {
    /// Parses a manifest from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads the manifest at `path`.
    /// If the file does not exist, it returns the default configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!(
                "No '{}' found. Using default configuration.",
                path.display()
            );
            return Ok(Self::default());
        }

        log::info!("Found '{}'. Loading configuration.", path.display());
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves the manifest directories against `base_dir`.
    pub fn environment(&self, base_dir: &Path) -> CompilationEnv {
        CompilationEnv {
            source_dir: base_dir.join(&self.source_directory),
            target_dir: base_dir.join(&self.target_directory),
            temp_dir: base_dir.join(&self.temp_directory),
            identifier_file: Some(base_dir.join(&self.identifier_file)),
            root_namespace: self.root_namespace.clone(),
        }
    }

    /// Compiles the override declarations.
    pub fn override_set(&self) -> Result<OverrideSet, OverrideError> {
        OverrideSet::new(self.overrides.iter().cloned())
    }

    /// The project list: the explicit `assets` entries, or every file under
    /// the source directory.
    pub fn project_paths(&self, env: &CompilationEnv) -> Result<Vec<AssetPath>, ConfigError> {
        match &self.assets {
            Some(entries) => entries
                .iter()
                .map(|entry| AssetPath::new(entry).map_err(ConfigError::from))
                .collect(),
            None => discovery::scan_directory(&env.source_dir),
        }
    }
}

/// The directories a compilation reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationEnv {
    /// Root of the source assets.
    pub source_dir: PathBuf,
    /// Root of the compiled containers.
    pub target_dir: PathBuf,
    /// Root of stamps and cached artifacts.
    pub temp_dir: PathBuf,
    /// The generated identifier list, if one is wanted.
    pub identifier_file: Option<PathBuf>,
    /// Module path the identifier list is rooted under.
    pub root_namespace: String,
}

impl CompilationEnv {
    /// An environment without identifier list generation.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            temp_dir: temp_dir.into(),
            identifier_file: None,
            root_namespace: "assets".to_string(),
        }
    }

    /// Enables identifier list generation into `path`.
    pub fn with_identifier_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identifier_file = Some(path.into());
        self
    }

    /// Changes the module path of the identifier list.
    pub fn with_root_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.root_namespace = namespace.into();
        self
    }

    /// Absolute location of a source asset.
    pub fn source_path(&self, path: &AssetPath) -> PathBuf {
        path.to_path(&self.source_dir)
    }

    /// Absolute location of a compiled file.
    pub fn target_path(&self, path: &AssetPath) -> PathBuf {
        path.to_path(&self.target_dir)
    }
}

/// Everything needed to build a project, loaded from its manifest.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directories of the build.
    pub env: CompilationEnv,
    /// The compiled override declarations.
    pub overrides: OverrideSet,
    /// The unfiltered project list.
    pub paths: Vec<AssetPath>,
}

impl Project {
    /// Loads the manifest at `manifest_path` and resolves it relative to the
    /// manifest's directory.
    pub fn load(manifest_path: &Path) -> Result<Self, ConfigError> {
        let manifest = AssetManifest::load(manifest_path)?;
        let base_dir = match manifest_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let env = manifest.environment(&base_dir);
        let overrides = manifest.override_set()?;
        let paths = manifest.project_paths(&env)?;
        Ok(Self {
            env,
            overrides,
            paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegasus_core::OverrideTarget;

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest = AssetManifest::from_toml_str("").unwrap();
        assert_eq!(manifest, AssetManifest::default());
        assert_eq!(manifest.root_namespace, "assets");
        assert!(manifest.assets.is_none());
    }

    #[test]
    fn overrides_deserialize_with_field_defaults() {
        let manifest = AssetManifest::from_toml_str(
            r#"
            source_directory = "content"
            root_namespace = "game::assets"
            assets = ["Textures/Sun.png", "Skies/Day.png"]

            [[overrides]]
            pattern = "Skies/*.png"
            target = "cube_map"

            [[overrides]]
            pattern = "**/*.psd"
            ignore = true

            [[overrides]]
            pattern = "Ui/*.png"
            mipmaps = false
            uncompressed = true
            "#,
        )
        .unwrap();

        assert_eq!(manifest.source_directory, PathBuf::from("content"));
        assert_eq!(manifest.overrides.len(), 3);
        assert_eq!(manifest.overrides[0].target, OverrideTarget::CubeMap);
        assert!(manifest.overrides[0].mipmaps);
        assert!(manifest.overrides[1].ignore);
        assert_eq!(manifest.overrides[2].target, OverrideTarget::Texture2D);
        assert!(!manifest.overrides[2].mipmaps);
        assert!(manifest.overrides[2].uncompressed);
        assert_eq!(manifest.override_set().unwrap().len(), 3);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(AssetManifest::from_toml_str("source_dirs = [\"a\"]").is_err());
        assert!(AssetManifest::from_toml_str("[[overrides]]\nmipmaps = false\n").is_err());
        assert!(AssetManifest::from_toml_str(
            "[[overrides]]\npattern = \"Ui/*.png\"\nmipmap = false\n"
        )
        .is_err());
    }

    #[test]
    fn environment_resolves_against_the_base_directory() {
        let manifest = AssetManifest::default();
        let env = manifest.environment(Path::new("project"));
        assert_eq!(env.source_dir, Path::new("project").join("assets"));
        assert_eq!(env.temp_dir, Path::new("project").join(".dist/obj/assets"));
        assert_eq!(
            env.identifier_file,
            Some(Path::new("project").join(".dist/generated/asset_ids.rs"))
        );

        let path = AssetPath::new("Textures/Sun.png").unwrap();
        assert!(env.source_path(&path).ends_with("Sun.png"));
    }

    #[test]
    fn explicit_asset_lists_are_validated() {
        let env = CompilationEnv::new("src", "dst", "tmp");
        let manifest = AssetManifest {
            assets: Some(vec!["../escape.png".to_string()]),
            ..AssetManifest::default()
        };
        assert!(matches!(
            manifest.project_paths(&env),
            Err(ConfigError::InvalidPath(PathError::ParentSegment(_)))
        ));
    }

    #[test]
    fn missing_manifest_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = AssetManifest::load(&dir.path().join("Assets.toml")).unwrap();
        assert_eq!(manifest, AssetManifest::default());
    }
}
