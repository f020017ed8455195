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

//! Generation of the Rust identifier list for compiled assets.
//!
//! Every compiled file with an identifier becomes a constant:
//!
//! ```ignore
//! pub mod assets {
//!     pub mod textures {
//!         /// Compiled from `Textures/Sun.png`.
//!         pub const SUN: AssetId<Texture> = AssetId::new("Textures/Sun.png.pg", 0x...);
//!     }
//! }
//! ```

use crate::compiler::CompiledRecord;
use heck::{ToShoutySnakeCase, ToSnakeCase};
use pegasus_core::{AssetPath, AssetUuid};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

const INDENT: &str = "    ";

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "super", "Self"];

fn fix_leading_digit(name: String) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// A module name for a directory segment.
pub fn module_name(segment: &str) -> String {
    let name = fix_leading_digit(segment.to_snake_case());
    if name.is_empty() {
        "unnamed".to_string()
    } else if RESERVED.contains(&name.as_str()) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name.as_str()) {
        format!("r#{name}")
    } else {
        name
    }
}

/// A constant name for the last segment of an identifier.
pub fn constant_name(segment: &str) -> String {
    let name = fix_leading_digit(segment.to_shouty_snake_case());
    if name.is_empty() {
        "UNNAMED".to_string()
    } else {
        name
    }
}

#[derive(Debug)]
struct Entry {
    constant: String,
    type_name: String,
    source: AssetPath,
    target: AssetPath,
}

#[derive(Debug, Default)]
struct Module {
    children: BTreeMap<String, Module>,
    entries: Vec<Entry>,
}

impl Module {
    fn insert(&mut self, namespace: &[&str], entry: Entry) {
        match namespace.split_first() {
            Some((first, rest)) => self
                .children
                .entry(module_name(first))
                .or_default()
                .insert(rest, entry),
            None => self.entries.push(entry),
        }
    }

    /// Suffixes colliding constants with their type, then numbers what
    /// still collides.
    fn resolve_names(&mut self) {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.constant.clone()).or_default() += 1;
        }
        for entry in &mut self.entries {
            if counts.get(&entry.constant).copied().unwrap_or_default() > 1 {
                entry.constant = format!(
                    "{}_{}",
                    entry.constant,
                    entry.type_name.to_shouty_snake_case()
                );
            }
        }

        self.entries.sort_by(|a, b| {
            a.constant
                .cmp(&b.constant)
                .then_with(|| a.target.cmp(&b.target))
        });
        let mut seen: HashMap<String, usize> = HashMap::new();
        for entry in &mut self.entries {
            let count = seen.entry(entry.constant.clone()).or_default();
            *count += 1;
            if *count > 1 {
                log::warn!(
                    "Identifiers: '{}' is declared twice, numbering the copy from '{}'.",
                    entry.constant,
                    entry.source
                );
                entry.constant = format!("{}_{}", entry.constant, count);
            }
        }

        for child in self.children.values_mut() {
            child.resolve_names();
        }
    }

    fn render(&self, out: &mut String, depth: usize) {
        let indent = INDENT.repeat(depth);
        for entry in &self.entries {
            let uuid = AssetUuid::from_path(&entry.target).as_u128();
            let _ = writeln!(out, "{indent}/// Compiled from `{}`.", entry.source);
            let _ = writeln!(
                out,
                "{indent}pub const {}: AssetId<{}> = AssetId::new({:?}, 0x{uuid:032x});",
                entry.constant,
                entry.type_name,
                entry.target.as_str()
            );
        }
        for (name, child) in &self.children {
            let _ = writeln!(out, "{indent}pub mod {name} {{");
            let _ = writeln!(out, "{indent}{INDENT}#[allow(unused_imports)]");
            let _ = writeln!(out, "{indent}{INDENT}use super::*;");
            child.render(out, depth + 1);
            let _ = writeln!(out, "{indent}}}");
        }
    }
}

/// Renders the identifier list for `records` under `root_namespace`
/// (`::` separated). The output is deterministic.
pub fn generate(records: &[CompiledRecord], root_namespace: &str) -> String {
    let mut root = Module::default();
    for record in records {
        let Some(identifier) = &record.identifier else {
            continue;
        };
        root.insert(
            &identifier.namespace(),
            Entry {
                constant: constant_name(identifier.member()),
                type_name: identifier.type_name.clone(),
                source: record.source.clone(),
                target: record.target.clone(),
            },
        );
    }
    root.resolve_names();

    let mut roots: Vec<String> = root_namespace
        .split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(module_name)
        .collect();
    if roots.is_empty() {
        roots.push("assets".to_string());
    }

    let mut out = String::new();
    out.push_str("// @generated by pegasus-pipeline. Do not edit.\n\n");
    for (depth, name) in roots.iter().enumerate() {
        let indent = INDENT.repeat(depth);
        let _ = writeln!(out, "{indent}pub mod {name} {{");
    }
    let depth = roots.len();
    let indent = INDENT.repeat(depth);
    let _ = writeln!(out, "{indent}#![allow(dead_code)]");
    let _ = writeln!(out, "{indent}#[allow(unused_imports)]");
    let _ = writeln!(out, "{indent}use ::pegasus_core::asset::*;");
    root.render(&mut out, depth);
    for depth in (0..roots.len()).rev() {
        let indent = INDENT.repeat(depth);
        let _ = writeln!(out, "{indent}}}");
    }
    out
}

/// Writes `contents` to `path` unless the file already holds exactly that.
/// Returns whether the file was written.
pub fn write_if_changed(path: &Path, contents: &str) -> io::Result<bool> {
    match fs::read_to_string(path) {
        Ok(existing) if existing == contents => return Ok(false),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegasus_core::{AssetType, Identifier};

    fn record(source: &str, target: &str, ty: AssetType, name: Option<&str>) -> CompiledRecord {
        CompiledRecord {
            source: AssetPath::new(source).unwrap(),
            target: AssetPath::new(target).unwrap(),
            asset_type: ty,
            identifier: name.map(|n| Identifier::new(n, ty.type_name())),
        }
    }

    #[test]
    fn same_name_with_different_types_gives_two_declarations() {
        let records = vec![
            record(
                "Shaders/Sky.fx",
                "Shaders/Sky.fx.vert.pg",
                AssetType::VertexShader,
                Some("Shaders/Sky"),
            ),
            record(
                "Shaders/Sky.fx",
                "Shaders/Sky.fx.frag.pg",
                AssetType::FragmentShader,
                Some("Shaders/Sky"),
            ),
            record(
                "Shaders/Sun.vert",
                "Shaders/Sun.vert.pg",
                AssetType::VertexShader,
                Some("Shaders/Sun"),
            ),
        ];
        let code = generate(&records, "assets");

        assert!(code.contains("pub const SKY_VERTEX_SHADER: AssetId<VertexShader>"));
        assert!(code.contains("pub const SKY_FRAGMENT_SHADER: AssetId<FragmentShader>"));
        assert!(code.contains("pub const SUN: AssetId<VertexShader>"));
        assert!(code.contains("pub mod shaders {"));
    }

    #[test]
    fn nests_namespaces_and_embeds_stable_uuids() {
        let records = vec![record(
            "Textures/Space/Sun.png",
            "Textures/Space/Sun.png.pg",
            AssetType::Texture2D,
            Some("Textures/Space/Sun"),
        )];
        let code = generate(&records, "game::assets");
        let uuid = AssetUuid::from_path(&AssetPath::new("Textures/Space/Sun.png.pg").unwrap());

        let expected = format!(
            "// @generated by pegasus-pipeline. Do not edit.\n\n\
             pub mod game {{\n\
             \x20   pub mod assets {{\n\
             \x20       #![allow(dead_code)]\n\
             \x20       #[allow(unused_imports)]\n\
             \x20       use ::pegasus_core::asset::*;\n\
             \x20       pub mod textures {{\n\
             \x20           #[allow(unused_imports)]\n\
             \x20           use super::*;\n\
             \x20           pub mod space {{\n\
             \x20               #[allow(unused_imports)]\n\
             \x20               use super::*;\n\
             \x20               /// Compiled from `Textures/Space/Sun.png`.\n\
             \x20               pub const SUN: AssetId<Texture> = \
             AssetId::new(\"Textures/Space/Sun.png.pg\", 0x{:032x});\n\
             \x20           }}\n\
             \x20       }}\n\
             \x20   }}\n\
             }}\n",
            uuid.as_u128()
        );
        assert_eq!(code, expected);
    }

    #[test]
    fn records_without_identifiers_are_skipped() {
        let records = vec![record("Shaders/Sky.fx", "Shaders/Sky.fx.pg", AssetType::Effect, None)];
        assert!(!generate(&records, "assets").contains("pub const"));
    }

    #[test]
    fn names_are_sanitised() {
        assert_eq!(module_name("2D Sprites"), "_2d_sprites");
        assert_eq!(module_name("Type"), "r#type");
        assert_eq!(module_name("Self"), "self_");
        assert_eq!(module_name("---"), "unnamed");
        assert_eq!(constant_name("sun-flare 2"), "SUN_FLARE_2");
        assert_eq!(constant_name("8Ball"), "_8BALL");
    }

    #[test]
    fn exact_duplicates_are_numbered() {
        let records = vec![
            record("a/Foo.png", "a/Foo.png.pg", AssetType::Texture2D, Some("a/Foo")),
            record("a/foo.bmp", "a/foo.bmp.pg", AssetType::Texture2D, Some("a/foo")),
        ];
        let code = generate(&records, "assets");
        assert!(code.contains("pub const FOO_TEXTURE: AssetId<Texture>"));
        assert!(code.contains("pub const FOO_TEXTURE_2: AssetId<Texture>"));
    }

    #[test]
    fn unchanged_files_are_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated/ids.rs");
        assert!(write_if_changed(&path, "a").unwrap());
        assert!(!write_if_changed(&path, "a").unwrap());
        assert!(write_if_changed(&path, "b").unwrap());
    }
}
