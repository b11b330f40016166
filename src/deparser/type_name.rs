//! Rendering of declared type names.

use crate::constants::{CATALOG_SCHEMA_PREFIX, TYPE_REFERENCE_SUFFIXES};
use crate::parser::identifier_utils::{
    is_qualified, normalize_identifier, quote_identifier, split_qualified_name, strip_quotes,
};
use crate::util::{ends_with_ci, starts_with_ci};

/// Render a datum's type name for a `DECLARE` section.
///
/// `%ROWTYPE`/`%TYPE` references keep their base verbatim. Builtin types lose
/// a `pg_catalog.` qualifier, and unqualified names lose their quotes. Only
/// schema-qualified names are re-quoted, part by part.
pub fn render_type_name(typname: &str) -> String {
    let typname = typname.trim();
    if let Some((base, suffix)) = split_type_reference(typname) {
        return format!("{}{}", base, suffix);
    }

    let name = strip_catalog_prefix(typname);
    if !is_qualified(name) {
        return strip_quotes(name);
    }

    let (name, array_suffix) = split_trailing(name, b'[');
    let (name, modifier) = split_trailing(name, b'(');
    let parts: Vec<String> = split_qualified_name(name)
        .into_iter()
        .map(|part| quote_identifier(&normalize_identifier(part)).into_owned())
        .collect();
    format!("{}{}{}", parts.join("."), modifier, array_suffix)
}

/// If the type is worth hydrating, the base name to parse and the suffix to
/// keep aside. Only schema-qualified names qualify.
pub fn hydration_candidate(typname: &str) -> Option<(&str, Option<&str>)> {
    let typname = typname.trim();
    let (base, suffix) = match split_type_reference(typname) {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (typname, None),
    };
    let base = strip_catalog_prefix(base);
    if is_qualified(base) {
        Some((base, suffix))
    } else {
        None
    }
}

/// Split `base%ROWTYPE` / `base%TYPE` into base and suffix (as written).
pub fn split_type_reference(typname: &str) -> Option<(&str, &str)> {
    TYPE_REFERENCE_SUFFIXES.iter().find_map(|suffix| {
        if ends_with_ci(typname, suffix) {
            let at = typname.len() - suffix.len();
            Some((&typname[..at], &typname[at..]))
        } else {
            None
        }
    })
}

fn strip_catalog_prefix(name: &str) -> &str {
    if starts_with_ci(name, CATALOG_SCHEMA_PREFIX) {
        &name[CATALOG_SCHEMA_PREFIX.len()..]
    } else {
        name
    }
}

/// Split at the first `open` byte outside double quotes.
fn split_trailing(name: &str, open: u8) -> (&str, &str) {
    let mut in_quotes = false;
    for (i, b) in name.bytes().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            _ if b == open && !in_quotes => return (name[..i].trim_end(), &name[i..]),
            _ => {}
        }
    }
    (name, "")
}
