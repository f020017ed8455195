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

//! The binary container every compiled asset is stored in.
//!
//! ```text
//! | magic "PG" (2) | version u16 LE (2) | asset type tag (1) | payload ... |
//! ```
//!
//! The payload layout depends on the asset type. Payloads are built from the
//! little-endian primitives in [`PayloadWrite`] / [`PayloadRead`]: fixed-size
//! integers, and `u32` length-prefixed byte blobs and UTF-8 strings.

mod error;
mod header;
mod payload;

pub use error::*;
pub use header::*;
pub use payload::*;
