// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Stylesheet color-macro translation.
//!
//! Rewrites a small at-function syntax embedded in stylesheets into portable
//! color-mixing expressions:
//!
//! - `alphaLight(<amount>)` → `hsl(0 0% 100% / <amount>)` (white at opacity)
//! - `alphaDark(<amount>)` → `hsl(0 0% 0% / <amount>)` (black at opacity)
//!
//! Applied per style declaration on the non-framework pipeline only;
//! framework projects use framework-native styling and bypass this entirely.

use regex::Regex;

/// Translator with pre-compiled macro patterns.
pub struct MacroTranslator {
    light: Regex,
    dark: Regex,
}

impl MacroTranslator {
    /// Compiles the macro patterns.
    pub fn new() -> Self {
        Self {
            light: Regex::new(r"alphaLight\(([\d.]*)\)").unwrap(),
            dark: Regex::new(r"alphaDark\(([\d.]*)\)").unwrap(),
        }
    }

    /// Translates one declaration value.
    ///
    /// Exactly one macro occurrence is substituted per invocation: the
    /// first `alphaLight`, or failing that the first `alphaDark`. A value
    /// with two macro calls keeps the second verbatim; that single-match
    /// limit is observed behavior and deliberately preserved. Values
    /// without a macro pass through unchanged.
    pub fn translate(&self, value: &str) -> String {
        if value.contains("alphaLight") {
            self.light.replace(value, "hsl(0 0% 100% / $1)").into_owned()
        } else if value.contains("alphaDark") {
            self.dark.replace(value, "hsl(0 0% 0% / $1)").into_owned()
        } else {
            value.to_string()
        }
    }

    /// Translates every declaration in a stylesheet.
    ///
    /// Declarations are delimited by `;`, `{` and `}`; each segment gets one
    /// `translate` invocation, which keeps the per-declaration single-match
    /// behavior intact across a whole file.
    pub fn translate_stylesheet(&self, css: &str) -> String {
        let mut out = String::with_capacity(css.len());
        let mut segment = String::new();
        for ch in css.chars() {
            segment.push(ch);
            if matches!(ch, ';' | '{' | '}') {
                out.push_str(&self.translate(&segment));
                segment.clear();
            }
        }
        out.push_str(&self.translate(&segment));
        out
    }
}

impl Default for MacroTranslator {
    fn default() -> Self {
        Self::new()
    }
}
