// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Compilation pass results.

use std::time::Duration;

/// Everything one compilation pass produced.
///
/// Created fresh per pass, rendered to the console, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildResult {
    /// Wall-clock time of the pass.
    pub elapsed: Duration,
    /// Project errors, in the order the compiler reported them.
    pub errors: Vec<String>,
    /// Project warnings, in the order the compiler reported them.
    pub warnings: Vec<String>,
    /// Emitted output assets, sorted by name.
    pub assets: Vec<EmittedAsset>,
}

/// One emitted output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    /// Path relative to the output directory.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

impl BuildResult {
    /// Whether the compiled project contains errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether the compiled project contains warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
