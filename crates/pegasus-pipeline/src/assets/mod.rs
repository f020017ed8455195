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

//! Built-in asset kinds, each with its asset type, factory and compiler.

pub mod cube_map;
pub mod effect;
pub mod font;
pub mod shader;
pub mod surface;
pub mod template;
pub mod texture;

pub use cube_map::{CubeMapAsset, CubeMapCompiler, CubeMapFactory};
pub use effect::{EffectAsset, EffectCompiler, EffectFactory};
pub use font::{FontAsset, FontCompiler, FontFactory};
pub use shader::{ShaderAsset, ShaderCompiler, ShaderFactory, ShaderStage};
pub use surface::ImageSettings;
pub use template::{
    EntityTemplate, EntityTemplateAsset, EntityTemplateCompiler, EntityTemplateFactory,
};
pub use texture::{TextureAsset, TextureCompiler, TextureFactory};
