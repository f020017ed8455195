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

//! Turning project paths into asset candidates.

use crate::asset::Asset;
use pegasus_core::{AssetPath, OverrideSet};

/// Creates asset candidates for the project paths it recognises.
///
/// Factories run independently over the same path set. A factory may claim
/// any number of paths and may produce several candidates for one path; the
/// compilation unit keeps only paths claimed exactly once.
pub trait AssetFactory: Send {
    /// A short, unique name used in diagnostics.
    fn name(&self) -> &str;

    /// Creates the candidates for the paths this factory handles.
    fn create_assets(&self, paths: &[AssetPath], overrides: &OverrideSet) -> Vec<Box<dyn Asset>>;
}

/// Whether the path ends with any of `extensions` (without the leading dot).
pub fn has_extension(path: &AssetPath, extensions: &[&str]) -> bool {
    path.extension()
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}
