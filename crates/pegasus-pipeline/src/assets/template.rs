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

//! Data-driven entity templates written in RON.
//!
//! ```ron
//! EntityTemplate(
//!     name: "Ship",
//!     base: Some("Entity"),
//!     components: [
//!         (kind: "Transform", properties: { "position": Vec3(0.0, 1.0, 0.0) }),
//!         (kind: "Sprite", properties: { "tint": Color(255, 255, 255, 255) }),
//!     ],
//! )
//! ```

use crate::asset::Asset;
use crate::compiler::{write_container, AssetCompiler, CompileError, CompileInput, CompiledOutput};
use crate::factory::AssetFactory;
use pegasus_core::format::PayloadWrite;
use pegasus_core::{AssetPath, AssetType, OverrideSet};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::{BTreeMap, HashSet};

/// File suffix of entity templates.
pub const TEMPLATE_SUFFIX: &str = ".template.ron";

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Vec2(f32, f32),
    Vec3(f32, f32, f32),
    Color(u8, u8, u8, u8),
}

/// One component of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    /// The component type name.
    pub kind: String,
    /// Initial property values.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

/// A blueprint entities are instantiated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    /// Template name.
    pub name: String,
    /// The template this one extends.
    #[serde(default)]
    pub base: Option<String>,
    /// Components added to instances.
    #[serde(default)]
    pub components: Vec<ComponentTemplate>,
}

impl EntityTemplate {
    /// Parses a template from RON text.
    pub fn from_ron(text: &str) -> Result<Self, CompileError> {
        Ok(ron::from_str(text)?)
    }

    /// Checks names and component kinds.
    pub fn validate(&self) -> Result<(), CompileError> {
        if self.name.trim().is_empty() {
            return Err(CompileError::invalid("template name is empty"));
        }
        if self.base.as_deref() == Some(self.name.as_str()) {
            return Err(CompileError::invalid(format!(
                "template '{}' cannot extend itself",
                self.name
            )));
        }

        let mut kinds = HashSet::new();
        for component in &self.components {
            if component.kind.trim().is_empty() {
                return Err(CompileError::invalid("component kind is empty"));
            }
            if !kinds.insert(component.kind.as_str()) {
                return Err(CompileError::invalid(format!(
                    "component '{}' appears more than once",
                    component.kind
                )));
            }
            if component.properties.keys().any(|key| key.trim().is_empty()) {
                return Err(CompileError::invalid(format!(
                    "component '{}' has an unnamed property",
                    component.kind
                )));
            }
        }
        Ok(())
    }
}

/// A `.template.ron` file.
#[derive(Debug, Clone)]
pub struct EntityTemplateAsset {
    path: AssetPath,
}

impl EntityTemplateAsset {
    /// Creates a template asset.
    pub fn new(path: AssetPath) -> Self {
        Self { path }
    }
}

impl Asset for EntityTemplateAsset {
    fn path(&self) -> &AssetPath {
        &self.path
    }

    fn asset_type(&self) -> AssetType {
        AssetType::EntityTemplate
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Claims `.template.ron` files.
#[derive(Debug, Default)]
pub struct EntityTemplateFactory;

impl AssetFactory for EntityTemplateFactory {
    fn name(&self) -> &str {
        "entity_template"
    }

    fn create_assets(&self, paths: &[AssetPath], _overrides: &OverrideSet) -> Vec<Box<dyn Asset>> {
        paths
            .iter()
            .filter(|p| p.has_suffix(TEMPLATE_SUFFIX))
            .map(|p| Box::new(EntityTemplateAsset::new(p.clone())) as Box<dyn Asset>)
            .collect()
    }
}

/// Validates templates and stores them as `bincode`.
#[derive(Debug, Default)]
pub struct EntityTemplateCompiler;

impl AssetCompiler for EntityTemplateCompiler {
    type Asset = EntityTemplateAsset;

    fn name(&self) -> &str {
        "entity_template"
    }

    fn process(
        &mut self,
        _asset: &EntityTemplateAsset,
        input: &CompileInput<'_>,
    ) -> Result<CompiledOutput, CompileError> {
        let text = std::str::from_utf8(input.source)
            .map_err(|_| CompileError::invalid("template is not valid UTF-8"))?;
        let template = EntityTemplate::from_ron(text)?;
        template.validate()?;

        let encoded = bincode::serde::encode_to_vec(&template, bincode::config::standard())?;
        let bytes = write_container(AssetType::EntityTemplate, |w| {
            w.write_blob(&encoded)?;
            Ok(())
        })?;
        Ok(CompiledOutput::primary(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegasus_core::format::{PayloadRead, HEADER_SIZE};

    const SHIP: &str = r#"
        EntityTemplate(
            name: "Ship",
            base: Some("Entity"),
            components: [
                (kind: "Transform", properties: { "position": Vec3(0.0, 1.0, 0.0) }),
                (kind: "Sprite", properties: {
                    "tint": Color(255, 128, 0, 255),
                    "texture": Text("Textures/Ship"),
                }),
                (kind: "Health", properties: { "max": Int(100), "regenerates": Bool(true) }),
            ],
        )
    "#;

    #[test]
    fn parses_and_validates() {
        let template = EntityTemplate::from_ron(SHIP).unwrap();
        assert_eq!(template.name, "Ship");
        assert_eq!(template.base.as_deref(), Some("Entity"));
        assert_eq!(template.components.len(), 3);
        assert_eq!(
            template.components[1].properties["tint"],
            PropertyValue::Color(255, 128, 0, 255)
        );
        assert!(template.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_components_and_self_reference() {
        let mut template = EntityTemplate::from_ron(SHIP).unwrap();
        template.components.push(template.components[0].clone());
        assert!(template.validate().is_err());

        let template = EntityTemplate {
            name: "Loop".to_string(),
            base: Some("Loop".to_string()),
            components: Vec::new(),
        };
        assert!(template.validate().is_err());
    }

    #[test]
    fn syntax_errors_surface_as_ron_errors() {
        assert!(matches!(
            EntityTemplate::from_ron("EntityTemplate(name: )"),
            Err(CompileError::Ron(_))
        ));
    }

    #[test]
    fn compiled_payload_decodes_back() {
        let output = EntityTemplateCompiler
            .process(
                &EntityTemplateAsset::new(AssetPath::new("Ships/Ship.template.ron").unwrap()),
                &CompileInput {
                    source: SHIP.as_bytes(),
                    dependencies: &[],
                },
            )
            .unwrap();
        let mut payload = &output.bytes[HEADER_SIZE..];
        let blob = payload.read_blob().unwrap();
        let (decoded, _): (EntityTemplate, usize) =
            bincode::serde::decode_from_slice(&blob, bincode::config::standard()).unwrap();
        assert_eq!(decoded, EntityTemplate::from_ron(SHIP).unwrap());
    }

    #[test]
    fn factory_uses_the_double_extension() {
        let paths: Vec<_> = ["Ships/Ship.template.ron", "Config/settings.ron"]
            .iter()
            .map(|p| AssetPath::new(p).unwrap())
            .collect();
        let assets = EntityTemplateFactory.create_assets(&paths, &OverrideSet::empty());
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].path().as_str(), "Ships/Ship.template.ron");
    }
}
