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

//! Parser for the text flavour of AngelCode BMFont descriptors.
//!
//! ```text
//! info face="Arial" size=32
//! common lineHeight=32 base=26 scaleW=256 scaleH=256 pages=1
//! page id=0 file="arial_0.png"
//! chars count=1
//! char id=65 x=0 y=0 width=20 height=22 xoffset=0 yoffset=4 xadvance=20 page=0 chnl=15
//! kernings count=1
//! kerning first=65 second=86 amount=-2
//! ```

use crate::compiler::CompileError;
use std::collections::HashMap;
use std::str::FromStr;

/// A glyph of a bitmap font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub id: u32,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub x_offset: i16,
    pub y_offset: i16,
    pub x_advance: i16,
    pub page: u8,
}

/// A kerning pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kerning {
    pub first: u32,
    pub second: u32,
    pub amount: i16,
}

/// A parsed and validated descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmFont {
    pub face: String,
    pub size: u16,
    pub line_height: u16,
    pub base: u16,
    pub scale_width: u32,
    pub scale_height: u32,
    /// Page image file names, indexed by page id.
    pub pages: Vec<String>,
    pub glyphs: Vec<Glyph>,
    pub kernings: Vec<Kerning>,
}

/// The `key=value` pairs of one line.
struct Line<'a> {
    tag: &'a str,
    line_no: usize,
    values: HashMap<&'a str, &'a str>,
}

impl<'a> Line<'a> {
    fn parse(number: usize, text: &'a str) -> Result<Option<Self>, CompileError> {
        let text = text.trim();
        let (tag, mut rest) = match text.split_once(char::is_whitespace) {
            Some((tag, rest)) => (tag, rest),
            None => (text, ""),
        };
        if tag.is_empty() {
            return Ok(None);
        }

        let mut values = HashMap::new();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            let (key, after_key) = rest.split_once('=').ok_or_else(|| {
                CompileError::invalid(format!("line {number}: expected key=value in '{rest}'"))
            })?;
            let (value, remainder) = if let Some(quoted) = after_key.strip_prefix('"') {
                let end = quoted.find('"').ok_or_else(|| {
                    CompileError::invalid(format!("line {number}: unterminated quoted value"))
                })?;
                (&quoted[..end], &quoted[end + 1..])
            } else {
                match after_key.split_once(char::is_whitespace) {
                    Some((value, remainder)) => (value, remainder),
                    None => (after_key, ""),
                }
            };
            values.insert(key.trim(), value);
            rest = remainder;
        }

        Ok(Some(Self {
            tag,
            line_no: number,
            values,
        }))
    }

    fn text(&self, key: &str) -> Result<&'a str, CompileError> {
        self.values.get(key).copied().ok_or_else(|| {
            CompileError::invalid(format!(
                "line {}: '{}' is missing '{key}'",
                self.line_no, self.tag
            ))
        })
    }

    fn number<T: FromStr>(&self, key: &str) -> Result<T, CompileError> {
        let text = self.text(key)?;
        text.parse().map_err(|_| {
            CompileError::invalid(format!(
                "line {}: '{key}={text}' is out of range",
                self.line_no
            ))
        })
    }

    fn number_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, CompileError> {
        if self.values.contains_key(key) {
            self.number(key)
        } else {
            Ok(default)
        }
    }
}

impl BmFont {
    /// Parses and validates a descriptor.
    pub fn parse(text: &str) -> Result<Self, CompileError> {
        let mut face = None;
        let mut size = None;
        let mut common = None;
        let mut declared_pages = 0usize;
        let mut pages: Vec<Option<String>> = Vec::new();
        let mut glyphs = Vec::new();
        let mut kernings = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let Some(line) = Line::parse(index + 1, raw)? else {
                continue;
            };
            match line.tag {
                "info" => {
                    face = Some(line.text("face")?.to_string());
                    let signed: i32 = line.number("size")?;
                    size = Some(u16::try_from(signed.unsigned_abs()).map_err(|_| {
                        CompileError::invalid(format!("font size {signed} is out of range"))
                    })?);
                }
                "common" => {
                    common = Some((
                        line.number::<u16>("lineHeight")?,
                        line.number::<u16>("base")?,
                        line.number::<u32>("scaleW")?,
                        line.number::<u32>("scaleH")?,
                    ));
                    declared_pages = line.number("pages")?;
                    if declared_pages == 0 || declared_pages > usize::from(u8::MAX) {
                        return Err(CompileError::invalid(format!(
                            "a font needs between 1 and 255 pages, found {declared_pages}"
                        )));
                    }
                    pages.resize(declared_pages, None);
                }
                "page" => {
                    let id: usize = line.number("id")?;
                    let slot = pages.get_mut(id).ok_or_else(|| {
                        CompileError::invalid(format!(
                            "line {}: page {id} exceeds the declared page count",
                            line.line_no
                        ))
                    })?;
                    if slot.is_some() {
                        return Err(CompileError::invalid(format!(
                            "line {}: page {id} is declared twice",
                            line.line_no
                        )));
                    }
                    *slot = Some(line.text("file")?.to_string());
                }
                "char" => glyphs.push(Glyph {
                    id: line.number("id")?,
                    x: line.number("x")?,
                    y: line.number("y")?,
                    width: line.number("width")?,
                    height: line.number("height")?,
                    x_offset: line.number("xoffset")?,
                    y_offset: line.number("yoffset")?,
                    x_advance: line.number("xadvance")?,
                    page: line.number_or("page", 0)?,
                }),
                "kerning" => kernings.push(Kerning {
                    first: line.number("first")?,
                    second: line.number("second")?,
                    amount: line.number("amount")?,
                }),
                "chars" | "kernings" => {}
                other => log::trace!("BmFont: ignoring '{other}' on line {}", line.line_no),
            }
        }

        let face = face.ok_or_else(|| CompileError::invalid("missing 'info' line"))?;
        let size = size.unwrap_or_default();
        let (line_height, base, scale_width, scale_height) =
            common.ok_or_else(|| CompileError::invalid("missing 'common' line"))?;
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(id, file)| {
                file.ok_or_else(|| CompileError::invalid(format!("page {id} is never declared")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(glyph) = glyphs.iter().find(|g| usize::from(g.page) >= pages.len()) {
            return Err(CompileError::invalid(format!(
                "glyph {} refers to missing page {}",
                glyph.id, glyph.page
            )));
        }

        Ok(Self {
            face,
            size,
            line_height,
            base,
            scale_width,
            scale_height,
            pages,
            glyphs,
            kernings,
        })
    }
}
