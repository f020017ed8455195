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

//! Compilers and the incremental build machinery around them.
//!
//! A compiler is written against one concrete asset type through
//! [`AssetCompiler`]. The compilation unit only sees the object-safe
//! [`ErasedCompiler`] produced by [`erase`], which selects the assets of the
//! right type and decides for each one whether to skip it, restore it from
//! the artifact cache or process it.

mod adapter;
mod cache;
mod output;

pub use adapter::*;
pub use cache::*;
pub use output::*;

use crate::asset::Asset;
use pegasus_core::asset::PathError;
use pegasus_core::{AssetPath, FormatError};
use std::path::PathBuf;
use thiserror::Error;

/// A failure confined to a single asset.
///
/// The compiler reporting it is marked as failed, but the remaining assets
/// are still compiled.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A source or dependency file could not be read.
    #[error("failed to read '{path}'")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Encoding the payload into memory failed.
    #[error("failed to write payload")]
    Write(#[from] std::io::Error),
    /// An image could not be decoded.
    #[error("failed to decode image")]
    Image(#[from] image::ImageError),
    /// The source is well-formed but its content is not acceptable.
    #[error("{0}")]
    Invalid(String),
    /// A container could not be written or read back.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A dependency path is not a valid asset path.
    #[error("invalid dependency path")]
    Path(#[from] PathError),
    /// A RON document could not be parsed.
    #[error("failed to parse document")]
    Ron(#[from] ron::error::SpannedError),
    /// A payload could not be encoded.
    #[error("failed to encode payload")]
    Encode(#[from] bincode::error::EncodeError),
}

impl CompileError {
    /// Shorthand for [`CompileError::Invalid`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// The message of this error followed by the messages of its sources.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}

/// The bytes a compiler works from.
#[derive(Debug, Clone, Copy)]
pub struct CompileInput<'a> {
    /// Contents of the asset's source file.
    pub source: &'a [u8],
    /// Contents of every declared dependency, in declaration order.
    pub dependencies: &'a [(AssetPath, Vec<u8>)],
}

impl<'a> CompileInput<'a> {
    /// The contents of a declared dependency.
    pub fn dependency(&self, path: &AssetPath) -> Option<&'a [u8]> {
        self.dependencies
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| bytes.as_slice())
    }
}

/// A compiler for one concrete asset type.
pub trait AssetCompiler: Send {
    /// The asset type this compiler handles.
    type Asset: Asset;

    /// A short, unique name used in diagnostics and fingerprints.
    fn name(&self) -> &str;

    /// Extra source files the output depends on, relative to the source
    /// directory. Their contents are folded into the fingerprint.
    fn dependencies(
        &self,
        _asset: &Self::Asset,
        _source: &[u8],
    ) -> Result<Vec<AssetPath>, CompileError> {
        Ok(Vec::new())
    }

    /// Compiles one asset.
    fn process(
        &mut self,
        asset: &Self::Asset,
        input: &CompileInput<'_>,
    ) -> Result<CompiledOutput, CompileError>;
}
