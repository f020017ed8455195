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

//! Cube maps, authored as a strip of six square faces.

use super::surface::{self, ImageSettings, IMAGE_EXTENSIONS};
use crate::asset::Asset;
use crate::compiler::{write_container, AssetCompiler, CompileError, CompileInput, CompiledOutput};
use crate::factory::{has_extension, AssetFactory};
use byteorder::{LittleEndian, WriteBytesExt};
use image::{imageops, RgbaImage};
use pegasus_core::{AssetPath, AssetType, OverrideSet, OverrideTarget};
use std::any::Any;

/// Number of faces of a cube map.
pub const FACE_COUNT: u32 = 6;

/// An image compiled as a cube map.
#[derive(Debug, Clone)]
pub struct CubeMapAsset {
    path: AssetPath,
    settings: ImageSettings,
}

impl CubeMapAsset {
    /// Creates a cube map asset.
    pub fn new(path: AssetPath, settings: ImageSettings) -> Self {
        Self { path, settings }
    }
}

impl Asset for CubeMapAsset {
    fn path(&self) -> &AssetPath {
        &self.path
    }

    fn asset_type(&self) -> AssetType {
        AssetType::CubeMap
    }

    fn settings_key(&self) -> String {
        self.settings.key()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Claims images matched by `cube_map` overrides, one candidate per override.
#[derive(Debug, Default)]
pub struct CubeMapFactory;

impl AssetFactory for CubeMapFactory {
    fn name(&self) -> &str {
        "cube_map"
    }

    fn create_assets(&self, paths: &[AssetPath], overrides: &OverrideSet) -> Vec<Box<dyn Asset>> {
        paths
            .iter()
            .filter(|p| has_extension(p, IMAGE_EXTENSIONS))
            .flat_map(|path| {
                overrides
                    .settings_for(path, OverrideTarget::CubeMap)
                    .map(move |declaration| {
                        Box::new(CubeMapAsset::new(
                            path.clone(),
                            ImageSettings::from(declaration),
                        )) as Box<dyn Asset>
                    })
            })
            .collect()
    }
}

/// Splits a strip into faces ordered +X, -X, +Y, -Y, +Z, -Z.
pub fn split_faces(strip: &RgbaImage) -> Result<Vec<RgbaImage>, CompileError> {
    let (width, height) = strip.dimensions();
    let (size, horizontal) = if height > 0 && width == height * FACE_COUNT {
        (height, true)
    } else if width > 0 && height == width * FACE_COUNT {
        (width, false)
    } else {
        return Err(CompileError::invalid(format!(
            "a cube map must be a 6:1 or 1:6 strip of square faces, found {width}x{height}"
        )));
    };

    Ok((0..FACE_COUNT)
        .map(|face| {
            let (x, y) = if horizontal {
                (face * size, 0)
            } else {
                (0, face * size)
            };
            imageops::crop_imm(strip, x, y, size, size).to_image()
        })
        .collect())
}

/// Writes a cube map container.
#[derive(Debug, Default)]
pub struct CubeMapCompiler;

impl AssetCompiler for CubeMapCompiler {
    type Asset = CubeMapAsset;

    fn name(&self) -> &str {
        "cube_map"
    }

    fn process(
        &mut self,
        asset: &CubeMapAsset,
        input: &CompileInput<'_>,
    ) -> Result<CompiledOutput, CompileError> {
        let strip = surface::decode_rgba(input.source)?;
        let faces = split_faces(&strip)?;
        drop(strip);

        let face_size = faces.first().map(|face| face.width()).unwrap_or_default();
        let chains: Vec<Vec<RgbaImage>> = faces
            .into_iter()
            .map(|face| surface::mip_chain(face, asset.settings.mipmaps))
            .collect();
        let level_count = match chains.first() {
            Some(levels) => surface::level_count(levels)?,
            None => 0,
        };

        let bytes = write_container(AssetType::CubeMap, |w| {
            w.write_u32::<LittleEndian>(face_size)?;
            w.write_u8(level_count)?;
            w.write_u8(asset.settings.flags())?;
            for levels in &chains {
                surface::write_levels(w, levels, !asset.settings.uncompressed)?;
            }
            Ok(())
        })?;
        Ok(CompiledOutput::primary(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pegasus_core::format::HEADER_SIZE;
    use pegasus_core::AssetOverride;
    use std::io::Cursor;

    fn strip(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let face = if width > height { x / height } else { y / width };
            Rgba([face as u8, 0, 0, 255])
        })
    }

    #[test]
    fn horizontal_and_vertical_strips_split_in_order() {
        for image in [strip(24, 4), strip(4, 24)] {
            let faces = split_faces(&image).unwrap();
            assert_eq!(faces.len(), 6);
            for (index, face) in faces.iter().enumerate() {
                assert_eq!(face.dimensions(), (4, 4));
                assert_eq!(face.get_pixel(1, 1)[0], index as u8);
            }
        }
    }

    #[test]
    fn other_layouts_are_rejected() {
        assert!(matches!(
            split_faces(&strip(16, 4)),
            Err(CompileError::Invalid(_))
        ));
    }

    #[test]
    fn factory_only_claims_cube_map_overrides() {
        let overrides = OverrideSet::new([AssetOverride::cube_map("Skies/*.png")]).unwrap();
        let paths = vec![
            AssetPath::new("Skies/Day.png").unwrap(),
            AssetPath::new("Sun.png").unwrap(),
        ];
        let assets = CubeMapFactory.create_assets(&paths, &overrides);
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].asset_type(), AssetType::CubeMap);
    }

    #[test]
    fn compiles_six_faces() {
        let mut source = Cursor::new(Vec::new());
        strip(12, 2)
            .write_to(&mut source, image::ImageFormat::Png)
            .unwrap();
        let source = source.into_inner();
        let asset = CubeMapAsset::new(
            AssetPath::new("Skies/Day.png").unwrap(),
            ImageSettings {
                mipmaps: false,
                uncompressed: true,
            },
        );
        let output = CubeMapCompiler
            .process(
                &asset,
                &CompileInput {
                    source: &source,
                    dependencies: &[],
                },
            )
            .unwrap();

        let payload = &output.bytes[HEADER_SIZE..];
        assert_eq!(&payload[..4], &2u32.to_le_bytes());
        assert_eq!(payload[4], 1);
        assert_eq!(payload[5], 0);
        // Six faces of one uncompressed 2x2 level: 8 bytes of size, 4 of length, 16 of pixels.
        assert_eq!(payload.len(), 6 + 6 * (8 + 4 + 16));
    }
}
