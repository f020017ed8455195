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

use super::AssetPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A stable identifier for a compiled asset.
///
/// The UUID is derived (version 5) from the normalised, lowercase target path,
/// so recompiling a project yields the same identifiers and generated code
/// does not churn between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetUuid(Uuid);

impl AssetUuid {
    /// Derives the UUID of a compiled asset from its target path.
    pub fn from_path(path: &AssetPath) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, path.key().as_bytes()))
    }

    /// Rebuilds a UUID from the raw value embedded in generated code.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// The raw 128-bit value.
    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }
}

impl fmt::Display for AssetUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_is_stable_and_case_insensitive() {
        let a = AssetUuid::from_path(&AssetPath::new("Textures/Sun.png.pg").unwrap());
        let b = AssetUuid::from_path(&AssetPath::new("textures/SUN.png.pg").unwrap());
        let c = AssetUuid::from_path(&AssetPath::new("Textures/Moon.png.pg").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(AssetUuid::from_u128(a.as_u128()), a);
    }
}
