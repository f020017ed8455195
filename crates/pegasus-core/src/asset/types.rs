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

use crate::format::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All asset types the pipeline knows how to compile.
///
/// The discriminant is the one-byte tag written after the container header,
/// so existing values must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AssetType {
    /// A two-dimensional texture with an optional mip chain.
    Texture2D = 1,
    /// Six square faces forming a cube map.
    CubeMap = 2,
    /// A bitmap font with its glyph pages.
    Font = 3,
    /// A vertex shader stage.
    VertexShader = 4,
    /// A fragment shader stage.
    FragmentShader = 5,
    /// An effect source. Effects compile into their shader stages and never
    /// produce a container of their own; the tag names the source kind in
    /// stamps and reports.
    Effect = 6,
    /// A data-driven entity template.
    EntityTemplate = 7,
}

impl AssetType {
    /// Every asset type, in tag order.
    pub const ALL: [AssetType; 7] = [
        AssetType::Texture2D,
        AssetType::CubeMap,
        AssetType::Font,
        AssetType::VertexShader,
        AssetType::FragmentShader,
        AssetType::Effect,
        AssetType::EntityTemplate,
    ];

    /// The tag stored in compiled containers.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// The marker type name generated code uses in `AssetId<...>`.
    pub fn type_name(self) -> &'static str {
        match self {
            AssetType::Texture2D => "Texture",
            AssetType::CubeMap => "CubeMap",
            AssetType::Font => "Font",
            AssetType::VertexShader => "VertexShader",
            AssetType::FragmentShader => "FragmentShader",
            AssetType::Effect => "Effect",
            AssetType::EntityTemplate => "EntityTemplate",
        }
    }
}

impl TryFrom<u8> for AssetType {
    type Error = FormatError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        AssetType::ALL
            .into_iter()
            .find(|ty| ty.tag() == tag)
            .ok_or(FormatError::UnknownAssetType(tag))
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_and_unknown_tags_are_rejected() {
        for ty in AssetType::ALL {
            assert_eq!(AssetType::try_from(ty.tag()).unwrap(), ty);
        }
        assert!(matches!(
            AssetType::try_from(0),
            Err(FormatError::UnknownAssetType(0))
        ));
        assert!(AssetType::try_from(200).is_err());
    }
}
