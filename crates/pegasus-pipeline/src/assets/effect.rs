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

//! Effects: a vertex and a fragment stage kept in one file.
//!
//! ```text
//! uniform mat4 view_projection;   // shared prelude
//!
//! @vertex
//! void main() { ... }
//!
//! @fragment
//! void main() { ... }
//! ```
//!
//! Each stage is compiled with the prelude prepended and written as its own
//! shader file next to the effect. The effect itself has no compiled file.

use super::shader::{self, ShaderStage};
use crate::asset::Asset;
use crate::compiler::{
    AssetCompiler, CompileError, CompileInput, CompiledOutput, DerivedOutput,
};
use crate::factory::{has_extension, AssetFactory};
use pegasus_core::{AssetPath, AssetType, Identifier, OverrideSet};
use std::any::Any;

/// An effect source file.
#[derive(Debug, Clone)]
pub struct EffectAsset {
    path: AssetPath,
}

impl EffectAsset {
    /// Creates an effect asset.
    pub fn new(path: AssetPath) -> Self {
        Self { path }
    }
}

impl Asset for EffectAsset {
    fn path(&self) -> &AssetPath {
        &self.path
    }

    fn asset_type(&self) -> AssetType {
        AssetType::Effect
    }

    fn identifier(&self) -> Option<Identifier> {
        None
    }

    fn create_target_path(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Claims `.fx` files.
#[derive(Debug, Default)]
pub struct EffectFactory;

impl AssetFactory for EffectFactory {
    fn name(&self) -> &str {
        "effect"
    }

    fn create_assets(&self, paths: &[AssetPath], _overrides: &OverrideSet) -> Vec<Box<dyn Asset>> {
        paths
            .iter()
            .filter(|p| has_extension(p, &["fx"]))
            .map(|p| Box::new(EffectAsset::new(p.clone())) as Box<dyn Asset>)
            .collect()
    }
}

/// The sections of an effect file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectSource {
    /// Text shared by both stages.
    pub prelude: String,
    /// The vertex stage body.
    pub vertex: String,
    /// The fragment stage body.
    pub fragment: String,
}

impl EffectSource {
    /// Splits an effect at its `@vertex` and `@fragment` markers.
    pub fn parse(text: &str) -> Result<Self, CompileError> {
        let mut prelude = String::new();
        let mut vertex: Option<String> = None;
        let mut fragment: Option<String> = None;
        let mut current = None;

        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if let Some(marker) = trimmed.strip_prefix('@') {
                let (slot, stage) = match marker.trim() {
                    "vertex" => (&mut vertex, ShaderStage::Vertex),
                    "fragment" => (&mut fragment, ShaderStage::Fragment),
                    other => {
                        return Err(CompileError::invalid(format!(
                            "line {}: unknown section '@{other}'",
                            index + 1
                        )))
                    }
                };
                if slot.is_some() {
                    return Err(CompileError::invalid(format!(
                        "line {}: '@{}' appears more than once",
                        index + 1,
                        marker.trim()
                    )));
                }
                *slot = Some(String::new());
                current = Some(stage);
                continue;
            }

            let target = match current {
                None => &mut prelude,
                Some(ShaderStage::Vertex) => vertex.get_or_insert_with(String::new),
                Some(ShaderStage::Fragment) => fragment.get_or_insert_with(String::new),
            };
            target.push_str(line);
            target.push('\n');
        }

        Ok(Self {
            prelude,
            vertex: vertex.ok_or_else(|| CompileError::invalid("missing '@vertex' section"))?,
            fragment: fragment
                .ok_or_else(|| CompileError::invalid("missing '@fragment' section"))?,
        })
    }

    /// The complete source of one stage.
    pub fn stage_source(&self, stage: ShaderStage) -> String {
        let body = match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        };
        format!("{}\n{}", self.prelude, body)
    }
}

/// Splits effects into their compiled shader stages.
#[derive(Debug, Default)]
pub struct EffectCompiler;

impl AssetCompiler for EffectCompiler {
    type Asset = EffectAsset;

    fn name(&self) -> &str {
        "effect"
    }

    fn process(
        &mut self,
        asset: &EffectAsset,
        input: &CompileInput<'_>,
    ) -> Result<CompiledOutput, CompileError> {
        let text = std::str::from_utf8(input.source)
            .map_err(|_| CompileError::invalid("effect source is not valid UTF-8"))?;
        let effect = EffectSource::parse(text)?;

        let mut derived = Vec::with_capacity(2);
        for (stage, extension) in [(ShaderStage::Vertex, "vert"), (ShaderStage::Fragment, "frag")] {
            let bytes = shader::compile_stage(stage, &effect.stage_source(stage))
                .map_err(|err| CompileError::invalid(format!("{extension} stage: {err}")))?;
            derived.push(DerivedOutput {
                path: asset.path.with_appended_extension(extension),
                asset_type: stage.asset_type(),
                identifier: Some(Identifier::new(
                    asset.path.logical_name(),
                    stage.asset_type().type_name(),
                )),
                bytes,
            });
        }

        Ok(CompiledOutput {
            bytes: Vec::new(),
            derived,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKY: &str = "uniform mat4 view_projection;\n\
        @vertex\n\
        in vec3 position;\n\
        void main() { gl_Position = view_projection * vec4(position, 1.0); }\n\
        @fragment\n\
        out vec4 color;\n\
        void main() { color = vec4(0.2, 0.4, 0.8, 1.0); }\n";

    fn compile(text: &str) -> Result<CompiledOutput, CompileError> {
        EffectCompiler.process(
            &EffectAsset::new(AssetPath::new("Shaders/Sky.fx").unwrap()),
            &CompileInput {
                source: text.as_bytes(),
                dependencies: &[],
            },
        )
    }

    #[test]
    fn splits_into_two_stages_sharing_the_prelude() {
        let effect = EffectSource::parse(SKY).unwrap();
        assert_eq!(effect.prelude, "uniform mat4 view_projection;\n");
        assert!(effect
            .stage_source(ShaderStage::Vertex)
            .starts_with("uniform mat4 view_projection;"));
        assert!(effect.fragment.contains("out vec4 color;"));
        assert!(!effect.vertex.contains("color"));
    }

    #[test]
    fn emits_derived_stages_with_a_shared_name() {
        let output = compile(SKY).unwrap();
        assert!(output.bytes.is_empty());

        let derived: Vec<_> = output
            .derived
            .iter()
            .map(|d| (d.target_path().to_string(), d.asset_type, d.identifier.clone()))
            .collect();
        assert_eq!(
            derived,
            vec![
                (
                    "Shaders/Sky.fx.vert.pg".to_string(),
                    AssetType::VertexShader,
                    Some(Identifier::new("Shaders/Sky", "VertexShader"))
                ),
                (
                    "Shaders/Sky.fx.frag.pg".to_string(),
                    AssetType::FragmentShader,
                    Some(Identifier::new("Shaders/Sky", "FragmentShader"))
                ),
            ]
        );
    }

    #[test]
    fn markers_must_appear_exactly_once() {
        assert!(EffectSource::parse("@vertex\nvoid main() {}\n").is_err());
        assert!(EffectSource::parse("@vertex\n@vertex\n@fragment\n").is_err());
        assert!(EffectSource::parse("@geometry\n").is_err());
    }

    #[test]
    fn invalid_stages_fail_the_effect() {
        let broken = SKY.replace("color = vec4(0.2, 0.4, 0.8, 1.0); }", "");
        assert!(matches!(compile(&broken), Err(CompileError::Invalid(_))));
    }

    #[test]
    fn effects_declare_no_identifier_of_their_own() {
        let asset = EffectAsset::new(AssetPath::new("Shaders/Sky.fx").unwrap());
        assert_eq!(asset.identifier(), None);
        assert!(!asset.create_target_path());
    }
}
