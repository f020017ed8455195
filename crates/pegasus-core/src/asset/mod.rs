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

//! Primitive types describing assets, shared by the compiler and the runtime.
//!
//! The key components are:
//! - [`AssetPath`]: a normalised, case-insensitive relative path.
//! - [`AssetType`]: the one-byte tag stored in every compiled container.
//! - [`Identifier`]: the name/type pair an asset exposes to generated code.
//! - [`AssetId`] and [`AssetUuid`]: the handles generated code refers to.

mod id;
mod identifier;
mod path;
mod types;
mod uuid;

pub use id::*;
pub use identifier::*;
pub use path::*;
pub use types::*;
pub use uuid::*;
