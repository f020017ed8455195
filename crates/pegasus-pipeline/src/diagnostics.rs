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

//! Warnings and errors reported while building a project.

use pegasus_core::AssetPath;
use std::fmt;

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The asset was skipped but the run can still succeed.
    Warning,
    /// The asset failed to compile.
    Error,
}

/// A single message attached to an asset, or to the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the message.
    pub severity: Severity,
    /// The asset the message is about.
    pub path: Option<AssetPath>,
    /// Human readable text.
    pub message: String,
}

impl Diagnostic {
    /// Whether this is a warning.
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{path}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Collects diagnostics and forwards each one to the log.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records and logs a warning.
    pub fn warn(&mut self, path: Option<&AssetPath>, message: impl Into<String>) {
        self.push(Severity::Warning, path, message.into());
    }

    /// Records and logs an error.
    pub fn error(&mut self, path: Option<&AssetPath>, message: impl Into<String>) {
        self.push(Severity::Error, path, message.into());
    }

    fn push(&mut self, severity: Severity, path: Option<&AssetPath>, message: String) {
        let diagnostic = Diagnostic {
            severity,
            path: path.cloned(),
            message,
        };
        match severity {
            Severity::Warning => log::warn!("CompilationUnit: {diagnostic}"),
            Severity::Error => log::error!("CompilationUnit: {diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    /// Moves every diagnostic of `other` into this collector.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// All recorded diagnostics, in the order they were raised.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// The recorded warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_warning())
    }

    /// Whether an error was recorded.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the collector.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
