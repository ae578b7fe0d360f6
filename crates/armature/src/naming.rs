// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Output and scoped-class naming.
//!
//! Production names embed a content hash so byte-identical artifacts stay
//! cache-stable and changed artifacts are never served stale; development
//! names are stable and human-readable. Scoped class names follow the same
//! split: debuggable in development, compact hashes in production.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Length in hex characters of embedded content hashes.
const HASH_LEN: usize = 8;

/// Filename templates for emitted artifacts.
///
/// Templates carry `[name]` and `[hash]` placeholders. Style templates are
/// absent in development: styles are inlined at runtime there and only
/// extracted into standalone artifacts in production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    /// Entry script template.
    pub script: String,
    /// Split-chunk script template.
    pub script_chunk: String,
    /// Extracted stylesheet template, production only.
    pub style: Option<String>,
    /// Split-chunk stylesheet template, production only.
    pub style_chunk: Option<String>,
}

/// Returns the naming scheme for the given mode.
pub fn output_naming(is_production: bool) -> OutputNaming {
    if is_production {
        OutputNaming {
            script: "static/js/[name].[hash].js".to_string(),
            script_chunk: "static/js/[name].[hash].chunk.js".to_string(),
            style: Some("static/css/[name].[hash].css".to_string()),
            style_chunk: Some("static/css/[name].[hash].chunk.css".to_string()),
        }
    } else {
        OutputNaming {
            script: "static/js/[name].js".to_string(),
            script_chunk: "static/js/[name].chunk.js".to_string(),
            style: None,
            style_chunk: None,
        }
    }
}

impl OutputNaming {
    /// Whether these templates embed a content hash.
    pub fn hashed(&self) -> bool {
        self.script.contains("[hash]")
    }
}

/// Expands a naming template for one logical chunk.
///
/// `[name]` takes the chunk name; `[hash]` takes the content hash when the
/// template asks for one.
pub fn expand_template(template: &str, chunk: &str, contents: &[u8]) -> String {
    let mut name = template.replace("[name]", chunk);
    if name.contains("[hash]") {
        name = name.replace("[hash]", &content_hash(contents));
    }
    name
}

/// First eight hex characters of the SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    short_hex(&Sha256::digest(bytes))
}

fn short_hex(digest: &[u8]) -> String {
    digest
        .iter()
        .take(HASH_LEN / 2)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Whether a stylesheet opts out of local-name rewriting.
///
/// Any file named `*.global.<ext>` is globally scoped: its class names are
/// left exactly as written.
pub fn is_global_stylesheet(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(".global"))
}

/// Generates the class name for one local identifier of a scoped stylesheet.
///
/// Development names are derived from the file and identifier for
/// debuggability; production names are a short hash of the same inputs.
/// Globally scoped files keep the identifier untouched.
pub fn scoped_class_name(is_production: bool, file: &Path, ident: &str) -> String {
    if is_global_stylesheet(file) {
        return ident.to_string();
    }
    if is_production {
        let mut hasher = Sha256::new();
        hasher.update(file.to_string_lossy().as_bytes());
        hasher.update([0]);
        hasher.update(ident.as_bytes());
        short_hex(&hasher.finalize())
    } else {
        let stem = file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("style");
        format!("{}__{}", stem, ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_naming_embeds_a_hash_segment() {
        let naming = output_naming(true);
        assert!(naming.hashed());
        assert!(naming.script.contains("[hash]"));
        assert!(naming.style.as_deref().unwrap().contains("[hash]"));
    }

    #[test]
    fn development_naming_is_stable() {
        let naming = output_naming(false);
        assert!(!naming.hashed());
        assert_eq!(naming.script, "static/js/[name].js");
        assert!(naming.style.is_none());
    }

    #[test]
    fn expansion_fills_name_and_hash() {
        let name = expand_template("static/js/[name].[hash].js", "main", b"bytes");
        assert!(name.starts_with("static/js/main."));
        assert!(name.ends_with(".js"));
        assert_eq!(name.len(), "static/js/main.".len() + HASH_LEN + ".js".len());
    }

    #[test]
    fn content_hash_is_stable_and_short() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
        assert_eq!(content_hash(b"abc").len(), HASH_LEN);
    }

    #[test]
    fn scoped_names_differ_between_modes() {
        let file = Path::new("src/button.module.css");
        let dev = scoped_class_name(false, file, "primary");
        let prod = scoped_class_name(true, file, "primary");
        assert_eq!(dev, "button.module__primary");
        assert_eq!(prod.len(), HASH_LEN);
        assert_ne!(dev, prod);
        // Deterministic for equal inputs, distinct for distinct idents.
        assert_eq!(prod, scoped_class_name(true, file, "primary"));
        assert_ne!(prod, scoped_class_name(true, file, "secondary"));
    }

    #[test]
    fn global_stylesheets_are_exempt() {
        let file = Path::new("src/reset.global.css");
        assert!(is_global_stylesheet(file));
        assert_eq!(scoped_class_name(true, file, "page"), "page");
        assert_eq!(scoped_class_name(false, file, "page"), "page");
        assert!(!is_global_stylesheet(Path::new("src/reset.css")));
    }
}
