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

//! Pixel data shared by the texture, cube map and font compilers.

use crate::compiler::CompileError;
use byteorder::{LittleEndian, WriteBytesExt};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use pegasus_core::format::PayloadWrite;
use pegasus_core::AssetOverride;
use std::io::Write;

/// Set in the flags byte when every mip blob is LZ4 compressed.
pub const FLAG_COMPRESSED: u8 = 1;

/// File extensions decoded as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga"];

/// How an image is turned into GPU-ready pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSettings {
    /// Generate a full mip chain down to 1x1.
    pub mipmaps: bool,
    /// Store pixel data without LZ4 compression.
    pub uncompressed: bool,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            mipmaps: true,
            uncompressed: false,
        }
    }
}

impl From<&AssetOverride> for ImageSettings {
    fn from(declaration: &AssetOverride) -> Self {
        Self {
            mipmaps: declaration.mipmaps,
            uncompressed: declaration.uncompressed,
        }
    }
}

impl ImageSettings {
    /// Canonical text folded into fingerprints.
    pub fn key(&self) -> String {
        format!("mipmaps={};uncompressed={}", self.mipmaps, self.uncompressed)
    }

    /// The flags byte of a surface written with these settings.
    pub fn flags(&self) -> u8 {
        if self.uncompressed {
            0
        } else {
            FLAG_COMPRESSED
        }
    }
}

/// Decodes any supported image format into RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, CompileError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// The base image followed by successively halved levels, down to 1x1.
pub fn mip_chain(base: RgbaImage, mipmaps: bool) -> Vec<RgbaImage> {
    let mut levels = vec![base];
    if !mipmaps {
        return levels;
    }
    loop {
        let Some(last) = levels.last() else { break };
        let (width, height) = last.dimensions();
        if width <= 1 && height <= 1 {
            break;
        }
        let next = imageops::resize(
            last,
            (width / 2).max(1),
            (height / 2).max(1),
            FilterType::Triangle,
        );
        levels.push(next);
    }
    levels
}

/// Writes `width, height, blob` for every level.
pub fn write_levels(
    writer: &mut impl Write,
    levels: &[RgbaImage],
    compressed: bool,
) -> Result<(), CompileError> {
    for level in levels {
        writer.write_u32::<LittleEndian>(level.width())?;
        writer.write_u32::<LittleEndian>(level.height())?;
        if compressed {
            writer.write_blob(&lz4_flex::compress_prepend_size(level.as_raw()))?;
        } else {
            writer.write_blob(level.as_raw())?;
        }
    }
    Ok(())
}

/// The number of levels as stored in a payload.
pub fn level_count(levels: &[RgbaImage]) -> Result<u8, CompileError> {
    u8::try_from(levels.len())
        .map_err(|_| CompileError::invalid(format!("{} mip levels do not fit", levels.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn mip_chains_halve_down_to_one_pixel() {
        let base = RgbaImage::from_pixel(8, 2, Rgba([255, 0, 0, 255]));
        let sizes: Vec<_> = mip_chain(base, true)
            .iter()
            .map(|level| level.dimensions())
            .collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);

        let base = RgbaImage::from_pixel(8, 2, Rgba([255, 0, 0, 255]));
        assert_eq!(mip_chain(base, false).len(), 1);
    }

    #[test]
    fn compressed_levels_decompress_to_the_pixels() {
        let level = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 4]));
        let mut bytes = Vec::new();
        write_levels(&mut bytes, std::slice::from_ref(&level), true).unwrap();

        let blob = &bytes[12..];
        assert_eq!(
            lz4_flex::decompress_size_prepended(blob).unwrap(),
            level.as_raw().clone()
        );
    }

    #[test]
    fn settings_key_and_flags() {
        let settings = ImageSettings::from(&AssetOverride::texture("*").with_uncompressed(true));
        assert_eq!(settings.key(), "mipmaps=true;uncompressed=true");
        assert_eq!(settings.flags(), 0);
        assert_eq!(ImageSettings::default().flags(), FLAG_COMPRESSED);
    }
}
