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

use super::FormatError;
use crate::asset::AssetType;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// The two bytes every compiled asset starts with.
pub const MAGIC: [u8; 2] = *b"PG";

/// The container version written by this build.
///
/// Bump it whenever a payload layout changes; the runtime refuses to load
/// containers of any other version and the pipeline recompiles everything
/// because the version is part of each asset's fingerprint.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 5;

/// The fixed header at the start of every compiled asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetHeader {
    /// Container format version.
    pub version: u16,
    /// The kind of payload that follows.
    pub asset_type: AssetType,
}

impl AssetHeader {
    /// A header for the current format version.
    pub fn new(asset_type: AssetType) -> Self {
        Self {
            version: FORMAT_VERSION,
            asset_type,
        }
    }

    /// Writes the header.
    pub fn write(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_u16::<LittleEndian>(self.version)?;
        writer.write_u8(self.asset_type.tag())
    }

    /// Reads and validates a header.
    pub fn read(reader: &mut impl Read) -> Result<Self, FormatError> {
        let mut magic = [0u8; 2];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(FormatError::InvalidMagic(magic));
        }

        let version = reader.read_u16::<LittleEndian>()?;
        if version != FORMAT_VERSION {
            return Err(FormatError::UnsupportedVersion {
                found: version,
                expected: FORMAT_VERSION,
            });
        }

        let asset_type = AssetType::try_from(reader.read_u8()?)?;
        Ok(Self {
            version,
            asset_type,
        })
    }

    /// Reads a header and checks that it announces `expected`.
    pub fn read_expecting(
        reader: &mut impl Read,
        expected: AssetType,
    ) -> Result<Self, FormatError> {
        let header = Self::read(reader)?;
        if header.asset_type != expected {
            return Err(FormatError::UnexpectedAssetType {
                expected,
                found: header.asset_type,
            });
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_layout_is_fixed() {
        let mut bytes = Vec::new();
        AssetHeader::new(AssetType::Font).write(&mut bytes).unwrap();
        assert_eq!(bytes, vec![b'P', b'G', 1, 0, 3]);
        assert_eq!(bytes.len(), HEADER_SIZE);

        let header = AssetHeader::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(header, AssetHeader::new(AssetType::Font));
    }

    #[test]
    fn rejects_foreign_and_outdated_containers() {
        let bad_magic = [b'X', b'Y', 1, 0, 1];
        assert!(matches!(
            AssetHeader::read(&mut Cursor::new(&bad_magic)),
            Err(FormatError::InvalidMagic(_))
        ));

        let old = [b'P', b'G', 0, 0, 1];
        assert!(matches!(
            AssetHeader::read(&mut Cursor::new(&old)),
            Err(FormatError::UnsupportedVersion { found: 0, .. })
        ));

        let unknown = [b'P', b'G', 1, 0, 99];
        assert!(matches!(
            AssetHeader::read(&mut Cursor::new(&unknown)),
            Err(FormatError::UnknownAssetType(99))
        ));

        let truncated = [b'P', b'G', 1];
        assert!(matches!(
            AssetHeader::read(&mut Cursor::new(&truncated)),
            Err(FormatError::Io(_))
        ));
    }

    #[test]
    fn read_expecting_checks_the_type() {
        let mut bytes = Vec::new();
        AssetHeader::new(AssetType::Effect).write(&mut bytes).unwrap();
        assert!(matches!(
            AssetHeader::read_expecting(&mut Cursor::new(&bytes), AssetType::Font),
            Err(FormatError::UnexpectedAssetType {
                expected: AssetType::Font,
                found: AssetType::Effect
            })
        ));
    }
}
