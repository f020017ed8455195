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

//! Static registration of factories and compilers.
//!
//! The built-in kinds are listed here. Other crates add their own with
//! `inventory`:
//!
//! ```ignore
//! inventory::submit! {
//!     pegasus_pipeline::registry::FactoryRegistration {
//!         name: "audio",
//!         create: || Box::new(AudioFactory),
//!     }
//! }
//! ```

use crate::assets::{
    CubeMapCompiler, CubeMapFactory, EffectCompiler, EffectFactory, EntityTemplateCompiler,
    EntityTemplateFactory, FontCompiler, FontFactory, ShaderCompiler, ShaderFactory,
    TextureCompiler, TextureFactory,
};
use crate::compiler::{erase, ErasedCompiler};
use crate::factory::AssetFactory;
use std::collections::BTreeMap;

/// Registers an asset factory.
pub struct FactoryRegistration {
    /// Unique name. Extensions reusing a registered name are skipped.
    pub name: &'static str,
    /// Creates the factory.
    pub create: fn() -> Box<dyn AssetFactory>,
}

/// Registers an asset compiler.
pub struct CompilerRegistration {
    /// Unique name. Extensions reusing a registered name are skipped.
    pub name: &'static str,
    /// Creates the compiler.
    pub create: fn() -> Box<dyn ErasedCompiler>,
}

inventory::collect!(FactoryRegistration);
inventory::collect!(CompilerRegistration);

const BUILTIN_FACTORIES: &[FactoryRegistration] = &[
    FactoryRegistration {
        name: "cube_map",
        create: || Box::new(CubeMapFactory),
    },
    FactoryRegistration {
        name: "effect",
        create: || Box::new(EffectFactory),
    },
    FactoryRegistration {
        name: "entity_template",
        create: || Box::new(EntityTemplateFactory),
    },
    FactoryRegistration {
        name: "font",
        create: || Box::new(FontFactory),
    },
    FactoryRegistration {
        name: "shader",
        create: || Box::new(ShaderFactory),
    },
    FactoryRegistration {
        name: "texture",
        create: || Box::new(TextureFactory),
    },
];

const BUILTIN_COMPILERS: &[CompilerRegistration] = &[
    CompilerRegistration {
        name: "cube_map",
        create: || erase(CubeMapCompiler),
    },
    CompilerRegistration {
        name: "effect",
        create: || erase(EffectCompiler),
    },
    CompilerRegistration {
        name: "entity_template",
        create: || erase(EntityTemplateCompiler),
    },
    CompilerRegistration {
        name: "font",
        create: || erase(FontCompiler),
    },
    CompilerRegistration {
        name: "shader",
        create: || erase(ShaderCompiler),
    },
    CompilerRegistration {
        name: "texture",
        create: || erase(TextureCompiler),
    },
];

/// Merges the built-in table with the extension registrations, sorted by name.
fn collect<'a, T, R>(
    kind: &str,
    builtin: &'a [R],
    extensions: impl Iterator<Item = &'a R>,
    name: impl Fn(&R) -> &'static str,
    create: impl Fn(&R) -> T,
) -> Vec<T>
where
    R: 'a,
{
    let mut selected: BTreeMap<&'static str, &'a R> = BTreeMap::new();
    for registration in builtin {
        selected.insert(name(registration), registration);
    }
    for registration in extensions {
        let key = name(registration);
        if selected.contains_key(key) {
            log::warn!("Registry: {kind} '{key}' is already registered, skipping the duplicate.");
            continue;
        }
        selected.insert(key, registration);
    }
    selected.values().map(|registration| create(registration)).collect()
}

/// Instantiates every registered factory.
pub fn factories() -> Vec<Box<dyn AssetFactory>> {
    collect(
        "factory",
        BUILTIN_FACTORIES,
        inventory::iter::<FactoryRegistration>.into_iter(),
        |r| r.name,
        |r| (r.create)(),
    )
}

/// Instantiates every registered compiler.
pub fn compilers() -> Vec<Box<dyn ErasedCompiler>> {
    collect(
        "compiler",
        BUILTIN_COMPILERS,
        inventory::iter::<CompilerRegistration>.into_iter(),
        |r| r.name,
        |r| (r.create)(),
    )
}
