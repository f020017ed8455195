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

//! The source-side description of an asset awaiting compilation.

use pegasus_core::{AssetPath, AssetType, Identifier};
use std::any::Any;

/// The extension appended to a source path to form its compiled file.
pub const TARGET_EXTENSION: &str = "pg";

/// A source asset produced by a factory and consumed by a compiler.
///
/// The compilation unit owns assets as `Box<dyn Asset>` and drops them once
/// compilation is over, so any resource an implementation holds is released
/// through `Drop`.
pub trait Asset: Any + Send {
    /// The source path relative to the source directory.
    fn path(&self) -> &AssetPath;

    /// The container tag of the compiled output.
    fn asset_type(&self) -> AssetType;

    /// The identifier declared for generated code, if any.
    fn identifier(&self) -> Option<Identifier> {
        Some(Identifier::new(
            self.path().logical_name(),
            self.asset_type().type_name(),
        ))
    }

    /// Canonical form of the settings that influence compilation.
    ///
    /// It is folded into the incremental fingerprint, so two assets built
    /// from the same source with different settings never share outputs.
    fn settings_key(&self) -> String {
        String::new()
    }

    /// Whether compilation writes a primary output for this asset.
    fn create_target_path(&self) -> bool {
        true
    }

    /// The primary output path, relative to the target directory.
    fn target_path(&self) -> AssetPath {
        self.path().with_appended_extension(TARGET_EXTENSION)
    }

    /// Upcast used by compilers to recover the concrete asset type.
    fn as_any(&self) -> &dyn Any;
}

impl std::fmt::Debug for dyn Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset")
            .field("path", self.path())
            .field("type", &self.asset_type())
            .finish()
    }
}
