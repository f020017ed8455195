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
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Length-prefixed writes on top of `byteorder`'s primitives.
pub trait PayloadWrite: Write {
    /// Writes a `u32` length followed by the bytes.
    fn write_blob(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        let len = u32::try_from(bytes.len()).map_err(|_| FormatError::BlobTooLarge(bytes.len()))?;
        self.write_u32::<LittleEndian>(len)?;
        self.write_all(bytes)?;
        Ok(())
    }

    /// Writes a UTF-8 string as a blob.
    fn write_string(&mut self, value: &str) -> Result<(), FormatError> {
        self.write_blob(value.as_bytes())
    }
}

impl<W: Write + ?Sized> PayloadWrite for W {}

/// Reads the values written by [`PayloadWrite`].
pub trait PayloadRead: Read {
    /// Reads a `u32` length-prefixed byte blob.
    ///
    /// The blob is read incrementally so a corrupt length cannot trigger a
    /// huge allocation up front.
    fn read_blob(&mut self) -> Result<Vec<u8>, FormatError> {
        let len = self.read_u32::<LittleEndian>()? as u64;
        let mut bytes = Vec::new();
        let read = self.take(len).read_to_end(&mut bytes)?;
        if read as u64 != len {
            return Err(FormatError::Io(std::io::Error::from(
                std::io::ErrorKind::UnexpectedEof,
            )));
        }
        Ok(bytes)
    }

    /// Reads a length-prefixed UTF-8 string.
    fn read_string(&mut self) -> Result<String, FormatError> {
        Ok(String::from_utf8(self.read_blob()?)?)
    }
}

impl<R: Read> PayloadRead for R {}
