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

//! Keeping only the project paths claimed by exactly one candidate.

use crate::asset::Asset;
use crate::diagnostics::Diagnostics;
use pegasus_core::AssetPath;
use std::collections::HashMap;

/// An asset together with the factory that produced it.
pub struct Candidate {
    /// Name of the producing factory.
    pub producer: String,
    /// The candidate itself.
    pub asset: Box<dyn Asset>,
}

/// Resolves candidates against the project list.
///
/// Paths without a candidate and paths with several candidates are reported
/// and excluded; all candidates of an ambiguous path are dropped. Candidates
/// for paths outside the project are dropped as well. The result is sorted
/// by path.
pub fn validate(
    project: &[AssetPath],
    candidates: Vec<Candidate>,
    diagnostics: &mut Diagnostics,
) -> Vec<Box<dyn Asset>> {
    let mut claims: HashMap<String, Vec<Candidate>> = HashMap::new();
    for candidate in candidates {
        claims
            .entry(candidate.asset.path().key().to_string())
            .or_default()
            .push(candidate);
    }

    let mut assets = Vec::new();
    for path in project {
        let Some(mut group) = claims.remove(path.key()) else {
            diagnostics.warn(Some(path), "no factory claims this file; it is skipped");
            continue;
        };
        if group.len() == 1 {
            if let Some(candidate) = group.pop() {
                assets.push(candidate.asset);
            }
            continue;
        }

        let producers = group
            .iter()
            .map(|c| format!("{} ({})", c.producer, c.asset.asset_type()))
            .collect::<Vec<_>>()
            .join(", ");
        diagnostics.warn(
            Some(path),
            format!("claimed by several factories: {producers}; it is skipped"),
        );
    }

    for (_, group) in claims {
        for candidate in group {
            diagnostics.warn(
                Some(candidate.asset.path()),
                format!(
                    "factory '{}' produced an asset for a file outside the project",
                    candidate.producer
                ),
            );
        }
    }

    assets.sort_by(|a, b| a.path().cmp(b.path()));
    assets
}
