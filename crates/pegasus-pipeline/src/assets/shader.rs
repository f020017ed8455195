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

//! GLSL vertex and fragment shaders.

use crate::asset::Asset;
use crate::compiler::{write_container, AssetCompiler, CompileError, CompileInput, CompiledOutput};
use crate::factory::{has_extension, AssetFactory};
use byteorder::WriteBytesExt;
use pegasus_core::format::PayloadWrite;
use pegasus_core::{AssetPath, AssetType, OverrideSet};
use std::any::Any;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Runs once per vertex.
    Vertex,
    /// Runs once per fragment.
    Fragment,
}

impl ShaderStage {
    /// The stage of a shader file, from its extension.
    pub fn from_path(path: &AssetPath) -> Option<Self> {
        if has_extension(path, &["vert", "vs"]) {
            Some(Self::Vertex)
        } else if has_extension(path, &["frag", "fs"]) {
            Some(Self::Fragment)
        } else {
            None
        }
    }

    /// The container tag of compiled shaders of this stage.
    pub fn asset_type(self) -> AssetType {
        match self {
            Self::Vertex => AssetType::VertexShader,
            Self::Fragment => AssetType::FragmentShader,
        }
    }

    /// The stage byte stored in the payload.
    pub fn code(self) -> u8 {
        match self {
            Self::Vertex => 0,
            Self::Fragment => 1,
        }
    }
}

/// A standalone shader source file.
#[derive(Debug, Clone)]
pub struct ShaderAsset {
    path: AssetPath,
    stage: ShaderStage,
}

impl ShaderAsset {
    /// Creates a shader asset.
    pub fn new(path: AssetPath, stage: ShaderStage) -> Self {
        Self { path, stage }
    }

    /// The stage of the shader.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Asset for ShaderAsset {
    fn path(&self) -> &AssetPath {
        &self.path
    }

    fn asset_type(&self) -> AssetType {
        self.stage.asset_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Claims `.vert`/`.vs` and `.frag`/`.fs` files.
#[derive(Debug, Default)]
pub struct ShaderFactory;

impl AssetFactory for ShaderFactory {
    fn name(&self) -> &str {
        "shader"
    }

    fn create_assets(&self, paths: &[AssetPath], _overrides: &OverrideSet) -> Vec<Box<dyn Asset>> {
        paths
            .iter()
            .filter_map(|path| {
                let stage = ShaderStage::from_path(path)?;
                Some(Box::new(ShaderAsset::new(path.clone(), stage)) as Box<dyn Asset>)
            })
            .collect()
    }
}

/// Removes comments, surrounding whitespace and blank lines.
pub fn preprocess(source: &str) -> String {
    let mut stripped = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        let lookahead = chars.peek().copied();
        match (c, lookahead) {
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        stripped.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        stripped.push('\n');
                    }
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            _ => stripped.push(c),
        }
    }

    stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Checks that preprocessed source has an entry point and balanced braces.
pub fn validate(source: &str) -> Result<(), CompileError> {
    let compact = source.split_whitespace().collect::<Vec<_>>().join(" ");
    if !compact.contains("void main(") && !compact.contains("void main (") {
        return Err(CompileError::invalid("no 'void main()' entry point"));
    }

    let mut depth = 0usize;
    for c in source.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| CompileError::invalid("unbalanced '}'"))?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(CompileError::invalid(format!("{depth} unclosed '{{'")));
    }
    Ok(())
}

/// Preprocesses, validates and wraps a stage into a container.
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<Vec<u8>, CompileError> {
    let processed = preprocess(source);
    validate(&processed)?;
    write_container(stage.asset_type(), |w| {
        w.write_u8(stage.code())?;
        w.write_string(&processed)?;
        Ok(())
    })
}

/// Compiles standalone vertex and fragment shaders.
#[derive(Debug, Default)]
pub struct ShaderCompiler;

impl AssetCompiler for ShaderCompiler {
    type Asset = ShaderAsset;

    fn name(&self) -> &str {
        "shader"
    }

    fn process(
        &mut self,
        asset: &ShaderAsset,
        input: &CompileInput<'_>,
    ) -> Result<CompiledOutput, CompileError> {
        let source = std::str::from_utf8(input.source)
            .map_err(|_| CompileError::invalid("shader source is not valid UTF-8"))?;
        Ok(CompiledOutput::primary(compile_stage(asset.stage, source)?))
    }
}
