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

use crate::asset::AssetType;
use thiserror::Error;

/// Errors raised while reading a compiled asset container.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The underlying reader failed or ended early.
    #[error("I/O error while reading asset container: {0}")]
    Io(#[from] std::io::Error),
    /// The file does not start with the container magic.
    #[error("invalid container magic {0:02x?}")]
    InvalidMagic([u8; 2]),
    /// The container was written by an incompatible pipeline version.
    #[error("unsupported container version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u16,
        /// Version this build reads.
        expected: u16,
    },
    /// The asset type tag is not known.
    #[error("unknown asset type tag {0}")]
    UnknownAssetType(u8),
    /// The container holds a different asset type than requested.
    #[error("expected a {expected} container, found {found}")]
    UnexpectedAssetType {
        /// Type the caller asked for.
        expected: AssetType,
        /// Type found in the header.
        found: AssetType,
    },
    /// A length-prefixed string is not valid UTF-8.
    #[error("string in asset container is not valid UTF-8")]
    InvalidString(#[from] std::string::FromUtf8Error),
    /// A length prefix does not fit in the payload format.
    #[error("blob of {0} bytes is too large for the container format")]
    BlobTooLarge(usize),
}
