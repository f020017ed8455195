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

use super::{AssetType, AssetUuid};
use std::fmt;
use std::marker::PhantomData;

/// Implemented by the marker types that parameterise [`AssetId`].
pub trait AssetKind: 'static {
    /// The container tag of assets of this kind.
    const ASSET_TYPE: AssetType;
}

macro_rules! asset_kinds {
    ($($(#[$doc:meta])* $name:ident => $ty:ident,)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum $name {}

            impl AssetKind for $name {
                const ASSET_TYPE: AssetType = AssetType::$ty;
            }
        )*
    };
}

asset_kinds! {
    /// Marker for compiled two-dimensional textures.
    Texture => Texture2D,
    /// Marker for compiled cube maps.
    CubeMap => CubeMap,
    /// Marker for compiled fonts.
    Font => Font,
    /// Marker for compiled vertex shaders.
    VertexShader => VertexShader,
    /// Marker for compiled fragment shaders.
    FragmentShader => FragmentShader,
    /// Marker for compiled entity templates.
    EntityTemplate => EntityTemplate,
}

/// A compile-time checked reference to a compiled asset.
///
/// Values are emitted by the identifier list generator so that game code
/// never spells out a raw asset path.
pub struct AssetId<T: AssetKind> {
    path: &'static str,
    uuid: u128,
    _kind: PhantomData<fn() -> T>,
}

impl<T: AssetKind> AssetId<T> {
    /// Creates an id from a target path and its raw UUID.
    pub const fn new(path: &'static str, uuid: u128) -> Self {
        Self {
            path,
            uuid,
            _kind: PhantomData,
        }
    }

    /// The compiled file, relative to the target directory.
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// The stable UUID of the compiled asset.
    pub const fn uuid(&self) -> AssetUuid {
        AssetUuid::from_u128(self.uuid)
    }

    /// The container tag the compiled file starts with.
    pub fn asset_type(&self) -> AssetType {
        T::ASSET_TYPE
    }
}

impl<T: AssetKind> Clone for AssetId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: AssetKind> Copy for AssetId<T> {}

impl<T: AssetKind> PartialEq for AssetId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<T: AssetKind> Eq for AssetId<T> {}

impl<T: AssetKind> fmt::Debug for AssetId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetId")
            .field("type", &T::ASSET_TYPE)
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetPath;

    const SUN: AssetId<Texture> = AssetId::new("Textures/Sun.png.pg", 42);

    #[test]
    fn ids_are_const_constructible_and_typed() {
        assert_eq!(SUN.path(), "Textures/Sun.png.pg");
        assert_eq!(SUN.asset_type(), AssetType::Texture2D);
        assert_eq!(SUN.uuid().as_u128(), 42);
    }

    #[test]
    fn marker_names_match_type_names() {
        fn name_of<T: AssetKind>() -> &'static str {
            T::ASSET_TYPE.type_name()
        }
        assert_eq!(name_of::<Texture>(), "Texture");
        assert_eq!(name_of::<CubeMap>(), "CubeMap");
        assert_eq!(name_of::<EntityTemplate>(), "EntityTemplate");

        let path = AssetPath::new("Textures/Sun.png.pg").unwrap();
        let id: AssetId<Texture> =
            AssetId::new("Textures/Sun.png.pg", AssetUuid::from_path(&path).as_u128());
        assert_eq!(id.uuid(), AssetUuid::from_path(&path));
    }
}
