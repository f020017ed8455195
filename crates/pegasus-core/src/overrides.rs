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

//! Declarative overrides of the default per-asset compilation settings.
//!
//! A project lists overrides as `(pattern, settings)` pairs. The pattern is a
//! case-insensitive glob over asset paths (`*` stays within one directory,
//! `**` crosses directories). An override either excludes matching paths from
//! compilation (`ignore`) or changes how a matching image is compiled:
//! as a 2D texture or a cube map, with or without mipmaps and compression.

use crate::asset::AssetPath;
use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Patterns are lowercased and matched against `AssetPath::key`, so case
// folding follows the same Unicode rules as path equality.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// An error in an override declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    /// The pattern is empty.
    #[error("override pattern is empty")]
    EmptyPattern,
    /// The pattern is not a valid glob.
    #[error("invalid override pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why the glob parser rejected it.
        reason: String,
    },
}

/// Which kind of image asset an override describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OverrideTarget {
    /// Compile matching images as 2D textures.
    #[default]
    #[serde(rename = "texture_2d")]
    Texture2D,
    /// Compile matching images as cube maps.
    #[serde(rename = "cube_map")]
    CubeMap,
}

fn default_mipmaps() -> bool {
    true
}

/// A single override declaration, as written in the project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetOverride {
    /// Glob matched against asset paths.
    pub pattern: String,
    /// How matching images are compiled.
    #[serde(default)]
    pub target: OverrideTarget,
    /// Whether a mip chain is generated.
    #[serde(default = "default_mipmaps")]
    pub mipmaps: bool,
    /// Whether pixel data is stored without compression.
    #[serde(default)]
    pub uncompressed: bool,
    /// Excludes matching paths from compilation entirely.
    #[serde(default)]
    pub ignore: bool,
}

impl AssetOverride {
    /// An override excluding every matching path.
    pub fn ignore(pattern: impl Into<String>) -> Self {
        Self {
            ignore: true,
            ..Self::texture(pattern)
        }
    }

    /// A 2D texture override with the default settings.
    pub fn texture(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            target: OverrideTarget::Texture2D,
            mipmaps: true,
            uncompressed: false,
            ignore: false,
        }
    }

    /// A cube map override with the default settings.
    pub fn cube_map(pattern: impl Into<String>) -> Self {
        Self {
            target: OverrideTarget::CubeMap,
            ..Self::texture(pattern)
        }
    }

    /// Sets whether mipmaps are generated.
    pub fn with_mipmaps(mut self, mipmaps: bool) -> Self {
        self.mipmaps = mipmaps;
        self
    }

    /// Sets whether pixel data is left uncompressed.
    pub fn with_uncompressed(mut self, uncompressed: bool) -> Self {
        self.uncompressed = uncompressed;
        self
    }
}

/// A validated list of overrides with compiled patterns.
#[derive(Debug, Clone, Default)]
pub struct OverrideSet {
    entries: Vec<(Pattern, AssetOverride)>,
}

impl OverrideSet {
    /// Compiles and validates every pattern.
    pub fn new(overrides: impl IntoIterator<Item = AssetOverride>) -> Result<Self, OverrideError> {
        let mut entries = Vec::new();
        for mut declaration in overrides {
            declaration.pattern = declaration.pattern.trim().replace('\\', "/");
            if declaration.pattern.is_empty() {
                return Err(OverrideError::EmptyPattern);
            }
            let folded = declaration.pattern.to_lowercase();
            let pattern = Pattern::new(&folded).map_err(|e| OverrideError::InvalidPattern {
                pattern: declaration.pattern.clone(),
                reason: e.msg.to_string(),
            })?;
            entries.push((pattern, declaration));
        }
        Ok(Self { entries })
    }

    /// An empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no declarations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every declaration whose pattern matches `path`, in manifest order.
    pub fn matching<'a>(&'a self, path: &'a AssetPath) -> impl Iterator<Item = &'a AssetOverride> {
        self.entries
            .iter()
            .filter(move |(pattern, _)| pattern.matches_with(path.key(), MATCH_OPTIONS))
            .map(|(_, declaration)| declaration)
    }

    /// Whether an `ignore` declaration matches `path`.
    pub fn is_ignored(&self, path: &AssetPath) -> bool {
        self.matching(path).any(|declaration| declaration.ignore)
    }

    /// The non-ignore declarations for `target` matching `path`.
    pub fn settings_for<'a>(
        &'a self,
        path: &'a AssetPath,
        target: OverrideTarget,
    ) -> impl Iterator<Item = &'a AssetOverride> {
        self.matching(path)
            .filter(move |declaration| !declaration.ignore && declaration.target == target)
    }
}
