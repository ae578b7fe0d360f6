// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Project options.
//!
//! Options are loaded from `armature.toml` at the project root (see the CLI
//! crate). Every field has a default, so an empty or absent file is a valid
//! configuration.
//!
//! # Example Configuration
//!
//! ```toml
//! uses_ui_framework = false
//! public_path_prefix = "/"
//!
//! [template_variables]
//! APP_NAME = "demo"
//! API_REVISION = 3
//!
//! [serve]
//! port = 8080
//! extra_static_dirs = ["mocks"]
//!
//! [build]
//! analyze_bundle = true
//! app_path = "sub/"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// All user-tunable knobs. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Options {
    /// Production mode. Supplied by the orchestrator, never by the options
    /// file: `build` sets it, `start` clears it.
    #[serde(skip)]
    pub is_production: bool,

    /// Whether the project uses the UI framework (default: true).
    ///
    /// Framework projects get the framework-flavored entry file and scoped
    /// style naming; plain projects get the macro translator and a custom
    /// element-creation transform instead.
    #[serde(default = "default_uses_ui_framework")]
    pub uses_ui_framework: bool,

    /// Base URL prefix for emitted asset references (default: "/").
    ///
    /// Always ends with a path separator after normalization. Overridden by
    /// `build.app_path` in production builds.
    #[serde(default = "default_public_path_prefix")]
    pub public_path_prefix: String,

    /// Placeholder values substituted into the HTML entry document and
    /// exposed to compiled code as build-time constants.
    #[serde(default)]
    pub template_variables: BTreeMap<String, TemplateValue>,

    /// Development-server settings.
    #[serde(default)]
    pub serve: ServeOptions,

    /// Production-build settings.
    #[serde(default)]
    pub build: BuildOptions,
}

/// A primitive placeholder value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    /// Boolean value, rendered as `true`/`false`.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Float(f64),
    /// String value, rendered verbatim.
    String(String),
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateValue::Bool(v) => write!(f, "{}", v),
            TemplateValue::Integer(v) => write!(f, "{}", v),
            TemplateValue::Float(v) => write!(f, "{}", v),
            TemplateValue::String(v) => f.write_str(v),
        }
    }
}

/// Development-server settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServeOptions {
    /// Additional directories served alongside `public/` (default: none).
    #[serde(default)]
    pub extra_static_dirs: Vec<PathBuf>,

    /// Port to listen on (default: 8080).
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Production-build settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildOptions {
    /// Emit a bundle-composition report after a production build.
    #[serde(default)]
    pub analyze_bundle: bool,

    /// Application mount path used as the base for all emitted asset URLs
    /// in production. Normalized to start and end with `/`.
    #[serde(default)]
    pub app_path: Option<String>,
}

fn default_uses_ui_framework() -> bool {
    true
}

fn default_public_path_prefix() -> String {
    "/".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Options {
    fn default() -> Self {
        Self {
            is_production: false,
            uses_ui_framework: default_uses_ui_framework(),
            public_path_prefix: default_public_path_prefix(),
            template_variables: BTreeMap::new(),
            serve: ServeOptions::default(),
            build: BuildOptions::default(),
        }
    }
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            extra_static_dirs: Vec::new(),
            port: default_port(),
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            analyze_bundle: false,
            app_path: None,
        }
    }
}

impl Options {
    /// Returns these options with production mode set.
    pub fn production(mut self) -> Self {
        self.is_production = true;
        self
    }

    /// Returns these options with development mode set.
    pub fn development(mut self) -> Self {
        self.is_production = false;
        self
    }
}

impl BuildOptions {
    /// The app path normalized to `/…/` form, if one was supplied.
    pub fn normalized_app_path(&self) -> Option<String> {
        self.app_path.as_deref().map(normalize_base_path)
    }
}

/// Normalizes a base URL path to start and end with `/`.
pub(crate) fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
