//! SKU identifier extraction from raw page text.
//!
//! Two rules run over the same text and their results are unioned:
//!
//! - **delimited**: `>XXXX-XXXX-XXXX<`, i.e. a table cell whose whole text
//!   content is a 14-character code (any character except newline in the
//!   `X` positions)
//! - **strict**: `[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}` anywhere, which
//!   recovers codes wrapped in nested markup
//!
//! Case is preserved; comparison-time normalization lives in
//! [`crate::table::normalize_key`].

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static DELIMITED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r">(.{4}-.{4}-.{4})<").expect("delimited SKU pattern is valid")
});

static STRICT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}").expect("strict SKU pattern is valid")
});

/// All candidate SKU identifiers in `text`, trimmed and deduplicated.
pub fn extract_identifiers(text: &str) -> BTreeSet<String> {
    let mut found = extract_delimited(text);
    found.extend(extract_strict(text));
    found
}

/// Identifiers matched by the `>XXXX-XXXX-XXXX<` rule only.
pub fn extract_delimited(text: &str) -> BTreeSet<String> {
    DELIMITED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| non_empty_trimmed(m.as_str()))
        .collect()
}

/// Identifiers matched by the context-free `[A-Z0-9]{4}-...` rule only.
pub fn extract_strict(text: &str) -> BTreeSet<String> {
    STRICT
        .find_iter(text)
        .filter_map(|m| non_empty_trimmed(m.as_str()))
        .collect()
}

fn non_empty_trimmed(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
