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

//! # Pegasus Core
//!
//! Foundational crate shared by the asset pipeline and the engine runtime.
//!
//! It defines the vocabulary both sides agree on: how asset paths are
//! normalised and compared, which asset types exist, how compiled assets are
//! laid out on disk, and the typed [`asset::AssetId`] handles that generated
//! identifier lists refer to.

#![warn(missing_docs)]

pub mod asset;
pub mod format;
pub mod overrides;

pub use asset::{AssetId, AssetPath, AssetType, AssetUuid, Identifier};
pub use format::{AssetHeader, FormatError, FORMAT_VERSION, MAGIC};
pub use overrides::{AssetOverride, OverrideError, OverrideSet, OverrideTarget};
