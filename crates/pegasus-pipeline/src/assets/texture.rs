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

//! Two-dimensional textures.

use super::surface::{self, ImageSettings, IMAGE_EXTENSIONS};
use crate::asset::Asset;
use crate::compiler::{write_container, AssetCompiler, CompileError, CompileInput, CompiledOutput};
use crate::factory::{has_extension, AssetFactory};
use byteorder::{LittleEndian, WriteBytesExt};
use pegasus_core::{AssetPath, AssetType, OverrideSet, OverrideTarget};
use std::any::Any;

/// An image compiled as a 2D texture.
#[derive(Debug, Clone)]
pub struct TextureAsset {
    path: AssetPath,
    settings: ImageSettings,
}

impl TextureAsset {
    /// Creates a texture asset.
    pub fn new(path: AssetPath, settings: ImageSettings) -> Self {
        Self { path, settings }
    }

    /// The compilation settings.
    pub fn settings(&self) -> ImageSettings {
        self.settings
    }
}

impl Asset for TextureAsset {
    fn path(&self) -> &AssetPath {
        &self.path
    }

    fn asset_type(&self) -> AssetType {
        AssetType::Texture2D
    }

    fn settings_key(&self) -> String {
        self.settings.key()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Claims image files.
///
/// Every matching `texture_2d` override yields one candidate. Images matched
/// by no override at all get a single candidate with the default settings;
/// images claimed by a `cube_map` override are left to the cube map factory.
#[derive(Debug, Default)]
pub struct TextureFactory;

impl AssetFactory for TextureFactory {
    fn name(&self) -> &str {
        "texture"
    }

    fn create_assets(&self, paths: &[AssetPath], overrides: &OverrideSet) -> Vec<Box<dyn Asset>> {
        let mut assets: Vec<Box<dyn Asset>> = Vec::new();
        for path in paths.iter().filter(|p| has_extension(p, IMAGE_EXTENSIONS)) {
            let before = assets.len();
            for declaration in overrides.settings_for(path, OverrideTarget::Texture2D) {
                assets.push(Box::new(TextureAsset::new(
                    path.clone(),
                    ImageSettings::from(declaration),
                )));
            }
            let is_cube_map = overrides
                .settings_for(path, OverrideTarget::CubeMap)
                .next()
                .is_some();
            if assets.len() == before && !is_cube_map {
                assets.push(Box::new(TextureAsset::new(
                    path.clone(),
                    ImageSettings::default(),
                )));
            }
        }
        assets
    }
}

/// Decodes images, builds their mip chain and writes a texture container.
#[derive(Debug, Default)]
pub struct TextureCompiler;

impl AssetCompiler for TextureCompiler {
    type Asset = TextureAsset;

    fn name(&self) -> &str {
        "texture"
    }

    fn process(
        &mut self,
        asset: &TextureAsset,
        input: &CompileInput<'_>,
    ) -> Result<CompiledOutput, CompileError> {
        let image = surface::decode_rgba(input.source)?;
        let (width, height) = image.dimensions();
        let levels = surface::mip_chain(image, asset.settings.mipmaps);
        let level_count = surface::level_count(&levels)?;

        let bytes = write_container(AssetType::Texture2D, |w| {
            w.write_u32::<LittleEndian>(width)?;
            w.write_u32::<LittleEndian>(height)?;
            w.write_u8(level_count)?;
            w.write_u8(asset.settings.flags())?;
            surface::write_levels(w, &levels, !asset.settings.uncompressed)
        })?;
        Ok(CompiledOutput::primary(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use pegasus_core::format::HEADER_SIZE;
    use pegasus_core::AssetOverride;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn paths(list: &[&str]) -> Vec<AssetPath> {
        list.iter().map(|p| AssetPath::new(p).unwrap()).collect()
    }

    #[test]
    fn factory_claims_images_with_override_settings() {
        let overrides = OverrideSet::new([
            AssetOverride::texture("Ui/*.png").with_mipmaps(false),
            AssetOverride::cube_map("Skies/*.png"),
        ])
        .unwrap();
        let assets = TextureFactory.create_assets(
            &paths(&["Ui/Button.PNG", "Skies/Day.png", "Sun.jpg", "Font.fnt"]),
            &overrides,
        );

        let claimed: Vec<_> = assets.iter().map(|a| a.path().as_str()).collect();
        assert_eq!(claimed, vec!["Ui/Button.PNG", "Sun.jpg"]);
        let button = assets[0].as_any().downcast_ref::<TextureAsset>().unwrap();
        assert!(!button.settings().mipmaps);
    }

    #[test]
    fn conflicting_texture_overrides_yield_one_candidate_each() {
        let overrides = OverrideSet::new([
            AssetOverride::texture("*.png"),
            AssetOverride::texture("Sun.*").with_uncompressed(true),
        ])
        .unwrap();
        let assets = TextureFactory.create_assets(&paths(&["Sun.png"]), &overrides);
        assert_eq!(assets.len(), 2);
    }

    #[test]
    fn compiles_a_mip_chain() {
        let asset = TextureAsset::new(AssetPath::new("Sun.png").unwrap(), ImageSettings::default());
        let source = png(4, 2);
        let output = TextureCompiler
            .process(
                &asset,
                &CompileInput {
                    source: &source,
                    dependencies: &[],
                },
            )
            .unwrap();

        let payload = &output.bytes[HEADER_SIZE..];
        assert_eq!(output.bytes[4], AssetType::Texture2D.tag());
        assert_eq!(&payload[..4], &4u32.to_le_bytes());
        assert_eq!(&payload[4..8], &2u32.to_le_bytes());
        assert_eq!(payload[8], 3);
        assert_eq!(payload[9], surface::FLAG_COMPRESSED);
        assert!(output.derived.is_empty());
    }

    #[test]
    fn garbage_fails_to_decode() {
        let asset = TextureAsset::new(AssetPath::new("Sun.png").unwrap(), ImageSettings::default());
        let result = TextureCompiler.process(
            &asset,
            &CompileInput {
                source: b"not an image",
                dependencies: &[],
            },
        );
        assert!(matches!(result, Err(CompileError::Image(_))));
    }
}
