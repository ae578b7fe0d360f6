// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Options-file loading.
//!
//! Project options live in `armature.toml` at the project root. The file is
//! optional and every field has a default, so loading has exactly one
//! failure mode: an absent or malformed file yields the defaults. A
//! malformed file additionally logs a warning so the misconfiguration is
//! visible without aborting the run.

use armature::Options;
use std::fs;
use std::path::Path;

/// Name of the options file at the project root.
pub const OPTIONS_FILE: &str = "armature.toml";

/// Loads project options from `armature.toml` under `root`.
pub fn load_options(root: &Path) -> Options {
    let path = root.join(OPTIONS_FILE);

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Options::default(),
    };

    match toml::from_str(&content) {
        Ok(options) => options,
        Err(err) => {
            tracing::warn!(
                "ignoring malformed {}: {}",
                OPTIONS_FILE,
                err.message()
            );
            Options::default()
        }
    }
}
