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

use super::CompileError;
use crate::asset::TARGET_EXTENSION;
use pegasus_core::{AssetHeader, AssetPath, AssetType, Identifier};
use serde::{Deserialize, Serialize};

/// An additional compiled file produced alongside an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedOutput {
    /// The derived asset's path, relative to the target directory, without
    /// the compiled file extension.
    pub path: AssetPath,
    /// The container tag of the derived file.
    pub asset_type: AssetType,
    /// The identifier declared for generated code, if any.
    pub identifier: Option<Identifier>,
    /// The complete container.
    pub bytes: Vec<u8>,
}

impl DerivedOutput {
    /// The file the output is written to, relative to the target directory.
    pub fn target_path(&self) -> AssetPath {
        self.path.with_appended_extension(TARGET_EXTENSION)
    }
}

/// Everything a compiler produced for one asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledOutput {
    /// The primary container. Ignored for assets that create no target file.
    pub bytes: Vec<u8>,
    /// Additional files.
    pub derived: Vec<DerivedOutput>,
}

impl CompiledOutput {
    /// An output consisting of a primary container only.
    pub fn primary(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            derived: Vec::new(),
        }
    }
}

/// One file written by a compilation, as reported and stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledRecord {
    /// The source asset the file was compiled from.
    pub source: AssetPath,
    /// The compiled file, relative to the target directory.
    pub target: AssetPath,
    /// The container tag of the file.
    pub asset_type: AssetType,
    /// The identifier declared for generated code, if any.
    pub identifier: Option<Identifier>,
}

/// Builds a container: the header for `asset_type` followed by whatever
/// `payload` writes.
pub fn write_container(
    asset_type: AssetType,
    payload: impl FnOnce(&mut Vec<u8>) -> Result<(), CompileError>,
) -> Result<Vec<u8>, CompileError> {
    let mut bytes = Vec::new();
    AssetHeader::new(asset_type).write(&mut bytes)?;
    payload(&mut bytes)?;
    Ok(bytes)
}
