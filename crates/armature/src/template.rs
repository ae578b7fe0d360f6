// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Placeholder substitution for the HTML entry document.
//!
//! Placeholders are `%IDENTIFIER%` tokens, env-var-style. Substitution is a
//! single pass over the document: every token whose name is present in the
//! mapping is replaced with the stringified value, and every token whose
//! name is absent collapses to the empty string. Replaced values are never
//! re-scanned, so substitution is order-independent across distinct keys.
//!
//! There is no escaping mechanism. A key whose token is a substring of
//! another key's token is undefined behavior and left undefined on purpose.

use crate::options::TemplateValue;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// `%IDENTIFIER%` with an env-var-style identifier.
const TOKEN_PATTERN: &str = "%([A-Za-z_][A-Za-z0-9_]*)%";

/// Replaces every `%KEY%` token in `document`.
///
/// Known keys substitute their stringified value, unknown keys substitute
/// the empty string. All occurrences are replaced, not just the first.
pub fn substitute(document: &str, variables: &BTreeMap<String, TemplateValue>) -> String {
    let token = Regex::new(TOKEN_PATTERN).unwrap();
    token
        .replace_all(document, |caps: &Captures<'_>| {
            variables
                .get(&caps[1])
                .map(|value| value.to_string())
                .unwrap_or_default()
        })
        .into_owned()
}
