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

//! Bitmap fonts described by BMFont text files.

mod bmfont;

pub use bmfont::*;

use super::surface;
use crate::asset::Asset;
use crate::compiler::{write_container, AssetCompiler, CompileError, CompileInput, CompiledOutput};
use crate::factory::{has_extension, AssetFactory};
use byteorder::{LittleEndian, WriteBytesExt};
use pegasus_core::format::PayloadWrite;
use pegasus_core::{AssetPath, AssetType, OverrideSet};
use std::any::Any;

/// A `.fnt` descriptor and the page images it references.
#[derive(Debug, Clone)]
pub struct FontAsset {
    path: AssetPath,
}

impl FontAsset {
    /// Creates a font asset.
    pub fn new(path: AssetPath) -> Self {
        Self { path }
    }
}

impl Asset for FontAsset {
    fn path(&self) -> &AssetPath {
        &self.path
    }

    fn asset_type(&self) -> AssetType {
        AssetType::Font
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Claims `.fnt` files.
#[derive(Debug, Default)]
pub struct FontFactory;

impl AssetFactory for FontFactory {
    fn name(&self) -> &str {
        "font"
    }

    fn create_assets(&self, paths: &[AssetPath], _overrides: &OverrideSet) -> Vec<Box<dyn Asset>> {
        paths
            .iter()
            .filter(|p| has_extension(p, &["fnt"]))
            .map(|p| Box::new(FontAsset::new(p.clone())) as Box<dyn Asset>)
            .collect()
    }
}

fn parse_descriptor(source: &[u8]) -> Result<BmFont, CompileError> {
    let text = std::str::from_utf8(source)
        .map_err(|_| CompileError::invalid("font descriptor is not valid UTF-8"))?;
    BmFont::parse(text)
}

/// Embeds the glyph pages and metrics of a bitmap font.
#[derive(Debug, Default)]
pub struct FontCompiler;

impl AssetCompiler for FontCompiler {
    type Asset = FontAsset;

    fn name(&self) -> &str {
        "font"
    }

    fn dependencies(
        &self,
        asset: &FontAsset,
        source: &[u8],
    ) -> Result<Vec<AssetPath>, CompileError> {
        let font = parse_descriptor(source)?;
        font.pages
            .iter()
            .map(|file| asset.path.sibling(file).map_err(CompileError::from))
            .collect()
    }

    fn process(
        &mut self,
        asset: &FontAsset,
        input: &CompileInput<'_>,
    ) -> Result<CompiledOutput, CompileError> {
        let font = parse_descriptor(input.source)?;

        let mut pages = Vec::with_capacity(font.pages.len());
        for file in &font.pages {
            let path = asset.path.sibling(file)?;
            let bytes = input.dependency(&path).ok_or_else(|| {
                CompileError::invalid(format!("page '{path}' was not loaded"))
            })?;
            let page = surface::decode_rgba(bytes)?;
            if page.dimensions() != (font.scale_width, font.scale_height) {
                return Err(CompileError::invalid(format!(
                    "page '{path}' is {}x{}, the descriptor declares {}x{}",
                    page.width(),
                    page.height(),
                    font.scale_width,
                    font.scale_height
                )));
            }
            pages.push(page);
        }

        let page_count = u8::try_from(pages.len())
            .map_err(|_| CompileError::invalid("too many font pages"))?;
        let glyph_count = u32::try_from(font.glyphs.len())
            .map_err(|_| CompileError::invalid("too many glyphs"))?;
        let kerning_count = u32::try_from(font.kernings.len())
            .map_err(|_| CompileError::invalid("too many kerning pairs"))?;

        let bytes = write_container(AssetType::Font, |w| {
            w.write_string(&font.face)?;
            w.write_u16::<LittleEndian>(font.size)?;
            w.write_u16::<LittleEndian>(font.line_height)?;
            w.write_u16::<LittleEndian>(font.base)?;

            w.write_u8(page_count)?;
            surface::write_levels(w, &pages, false)?;

            w.write_u32::<LittleEndian>(glyph_count)?;
            for glyph in &font.glyphs {
                w.write_u32::<LittleEndian>(glyph.id)?;
                w.write_u16::<LittleEndian>(glyph.x)?;
                w.write_u16::<LittleEndian>(glyph.y)?;
                w.write_u16::<LittleEndian>(glyph.width)?;
                w.write_u16::<LittleEndian>(glyph.height)?;
                w.write_i16::<LittleEndian>(glyph.x_offset)?;
                w.write_i16::<LittleEndian>(glyph.y_offset)?;
                w.write_i16::<LittleEndian>(glyph.x_advance)?;
                w.write_u8(glyph.page)?;
            }

            w.write_u32::<LittleEndian>(kerning_count)?;
            for kerning in &font.kernings {
                w.write_u32::<LittleEndian>(kerning.first)?;
                w.write_u32::<LittleEndian>(kerning.second)?;
                w.write_i16::<LittleEndian>(kerning.amount)?;
            }
            Ok(())
        })?;
        Ok(CompiledOutput::primary(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use pegasus_core::format::{PayloadRead, HEADER_SIZE};
    use std::io::Cursor;

    const DESCRIPTOR: &str = "info face=\"Mono\" size=8\n\
        common lineHeight=10 base=8 scaleW=4 scaleH=4 pages=1\n\
        page id=0 file=\"mono_0.png\"\n\
        char id=65 x=0 y=0 width=4 height=4 xoffset=0 yoffset=0 xadvance=5 page=0\n";

    fn page(size: u32) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        RgbaImage::from_pixel(size, size, Rgba([255; 4]))
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn asset() -> FontAsset {
        FontAsset::new(AssetPath::new("Fonts/Mono.fnt").unwrap())
    }

    #[test]
    fn pages_are_sibling_dependencies() {
        let deps = FontCompiler
            .dependencies(&asset(), DESCRIPTOR.as_bytes())
            .unwrap();
        assert_eq!(deps, vec![AssetPath::new("Fonts/mono_0.png").unwrap()]);
    }

    #[test]
    fn compiles_metrics_and_pages() {
        let deps = vec![(AssetPath::new("Fonts/mono_0.png").unwrap(), page(4))];
        let output = FontCompiler
            .process(
                &asset(),
                &CompileInput {
                    source: DESCRIPTOR.as_bytes(),
                    dependencies: &deps,
                },
            )
            .unwrap();

        let mut payload = Cursor::new(&output.bytes[HEADER_SIZE..]);
        assert_eq!(payload.read_string().unwrap(), "Mono");
        let mut metrics = [0u8; 7];
        std::io::Read::read_exact(&mut payload, &mut metrics).unwrap();
        assert_eq!(&metrics, &[8, 0, 10, 0, 8, 0, 1]);
    }

    #[test]
    fn page_size_must_match_the_descriptor() {
        let deps = vec![(AssetPath::new("Fonts/mono_0.png").unwrap(), page(8))];
        let result = FontCompiler.process(
            &asset(),
            &CompileInput {
                source: DESCRIPTOR.as_bytes(),
                dependencies: &deps,
            },
        );
        assert!(matches!(result, Err(CompileError::Invalid(_))));
    }

    #[test]
    fn factory_claims_fnt_files() {
        let paths = vec![
            AssetPath::new("Fonts/Mono.FNT").unwrap(),
            AssetPath::new("Fonts/mono_0.png").unwrap(),
        ];
        let assets = FontFactory.create_assets(&paths, &OverrideSet::empty());
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].asset_type(), AssetType::Font);
    }
}
