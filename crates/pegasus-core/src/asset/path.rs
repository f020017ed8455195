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

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// An error produced when a string cannot be turned into an [`AssetPath`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path has no segments.
    #[error("asset path is empty")]
    Empty,
    /// The path is rooted or carries a drive prefix.
    #[error("asset path '{0}' must be relative to the source directory")]
    Absolute(String),
    /// The path contains a `..` segment.
    #[error("asset path '{0}' must not leave the source directory")]
    ParentSegment(String),
    /// The path is not valid UTF-8.
    #[error("asset path '{0}' is not valid unicode")]
    NotUnicode(String),
}

/// A relative, forward-slash separated path to an asset source file.
///
/// Asset paths come from project manifests written by hand, so they are
/// normalised on construction (`\` becomes `/`, `.` segments and duplicate
/// separators disappear) and compared case-insensitively. The original
/// casing is kept for display and for opening files.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetPath {
    raw: String,
    key: String,
}

impl AssetPath {
    /// Parses and normalises a relative asset path.
    pub fn new(path: &str) -> Result<Self, PathError> {
        let unified = path.replace('\\', "/");
        if unified.starts_with('/') {
            return Err(PathError::Absolute(path.to_string()));
        }

        let mut segments = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(PathError::ParentSegment(path.to_string())),
                s if segments.is_empty() && s.ends_with(':') => {
                    return Err(PathError::Absolute(path.to_string()))
                }
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(PathError::Empty);
        }

        let raw = segments.join("/");
        let key = raw.to_lowercase();
        Ok(Self { raw, key })
    }

    /// Builds an asset path from a file system path relative to a source root.
    pub fn from_relative(path: &Path) -> Result<Self, PathError> {
        let text = path
            .to_str()
            .ok_or_else(|| PathError::NotUnicode(path.display().to_string()))?;
        Self::new(text)
    }

    /// The normalised path with its original casing.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The lowercase form used for comparisons and hashing.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The last segment of the path.
    pub fn file_name(&self) -> &str {
        self.raw.rsplit('/').next().unwrap_or(&self.raw)
    }

    /// Everything before the last segment, if the path has a directory.
    pub fn directory(&self) -> Option<&str> {
        self.raw.rsplit_once('/').map(|(dir, _)| dir)
    }

    /// The lowercase extension after the last dot of the file name.
    pub fn extension(&self) -> Option<String> {
        match self.file_name().rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_lowercase()),
            _ => None,
        }
    }

    /// Case-insensitive suffix test, used for multi-dot conventions such as
    /// `.template.ron`.
    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.key.ends_with(&suffix.to_lowercase())
    }

    /// The path with every extension of the file name removed.
    ///
    /// `Shaders/Sky.fx` and `Shaders/Sky.fx.vert` both map to `Shaders/Sky`.
    pub fn logical_name(&self) -> String {
        let file_name = self.file_name();
        let stem = match file_name.find('.') {
            Some(0) | None => file_name,
            Some(index) => &file_name[..index],
        };
        match self.directory() {
            Some(dir) => format!("{dir}/{stem}"),
            None => stem.to_string(),
        }
    }

    /// Returns a new path with `.{extension}` appended to the file name.
    pub fn with_appended_extension(&self, extension: &str) -> Self {
        let raw = format!("{}.{}", self.raw, extension);
        let key = raw.to_lowercase();
        Self { raw, key }
    }

    /// Returns a sibling path in the same directory.
    pub fn sibling(&self, file_name: &str) -> Result<Self, PathError> {
        match self.directory() {
            Some(dir) => Self::new(&format!("{dir}/{file_name}")),
            None => Self::new(file_name),
        }
    }

    /// Resolves the path against a root directory.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.raw.split('/').fold(root.to_path_buf(), |acc, s| acc.join(s))
    }
}

impl PartialEq for AssetPath {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for AssetPath {}

impl Hash for AssetPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for AssetPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AssetPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetPath({:?})", self.raw)
    }
}

impl TryFrom<String> for AssetPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl TryFrom<&str> for AssetPath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetPath> for String {
    fn from(path: AssetPath) -> Self {
        path.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_separators_and_dot_segments() {
        let path = AssetPath::new(".\\Textures//./Sun.png").unwrap();
        assert_eq!(path.as_str(), "Textures/Sun.png");
    }

    #[test]
    fn compares_case_insensitively_but_keeps_casing() {
        let a = AssetPath::new("Textures/Sun.PNG").unwrap();
        let b = AssetPath::new("textures/sun.png").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Textures/Sun.PNG");

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn rejects_paths_outside_the_source_directory() {
        assert_eq!(AssetPath::new(""), Err(PathError::Empty));
        assert_eq!(AssetPath::new("./"), Err(PathError::Empty));
        assert!(matches!(
            AssetPath::new("/etc/passwd"),
            Err(PathError::Absolute(_))
        ));
        assert!(matches!(
            AssetPath::new("C:/assets/a.png"),
            Err(PathError::Absolute(_))
        ));
        assert!(matches!(
            AssetPath::new("Textures/../../a.png"),
            Err(PathError::ParentSegment(_))
        ));
    }

    #[test]
    fn splits_names_and_extensions() {
        let path = AssetPath::new("Templates/Ship.Template.RON").unwrap();
        assert_eq!(path.file_name(), "Ship.Template.RON");
        assert_eq!(path.directory(), Some("Templates"));
        assert_eq!(path.extension().as_deref(), Some("ron"));
        assert!(path.has_suffix(".template.ron"));
        assert_eq!(path.logical_name(), "Templates/Ship");

        let root = AssetPath::new("Foo.png").unwrap();
        assert_eq!(root.directory(), None);
        assert_eq!(root.logical_name(), "Foo");

        let hidden = AssetPath::new(".hidden").unwrap();
        assert_eq!(hidden.extension(), None);
        assert_eq!(hidden.logical_name(), ".hidden");
    }

    #[test]
    fn derives_related_paths() {
        let path = AssetPath::new("Fonts/Arial.fnt").unwrap();
        assert_eq!(path.with_appended_extension("pg").as_str(), "Fonts/Arial.fnt.pg");
        assert_eq!(path.sibling("Arial_0.png").unwrap().as_str(), "Fonts/Arial_0.png");
        assert_eq!(
            path.to_path(Path::new("root")),
            Path::new("root").join("Fonts").join("Arial.fnt")
        );
    }
}
