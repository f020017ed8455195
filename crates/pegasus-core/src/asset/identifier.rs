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

use serde::{Deserialize, Serialize};
use std::fmt;

/// The name and type under which a compiled asset is exposed to code.
///
/// `name` is a logical, slash separated path such as `Textures/Sun`. The
/// identifier list generator turns its directories into modules and its last
/// segment into a constant of type `AssetId<type_name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    /// Logical name of the asset.
    pub name: String,
    /// Marker type name in generated code.
    pub type_name: String,
}

impl Identifier {
    /// Creates an identifier.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// The directory segments of the name.
    pub fn namespace(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.name.split('/').filter(|s| !s.is_empty()).collect();
        segments.pop();
        segments
    }

    /// The last segment of the name.
    pub fn member(&self) -> &str {
        self.name
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.type_name)
    }
}
