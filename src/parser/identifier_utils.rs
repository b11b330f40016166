//! Identifier handling for PostgreSQL names.
//!
//! PostgreSQL folds unquoted identifiers to lower case and keeps quoted ones
//! verbatim, doubling any embedded `"`. These helpers split, unquote and
//! re-quote names following those rules.

use std::borrow::Cow;

use crate::constants::RESERVED_KEYWORDS;

/// Whether `name` needs double quotes to survive a round trip through the
/// PostgreSQL lexer: anything other than a lowercase `[a-z_][a-z0-9_$]*`
/// word, or a reserved keyword.
pub fn needs_quoting(name: &str) -> bool {
    let mut bytes = name.bytes();
    let first_ok = matches!(bytes.next(), Some(b) if b.is_ascii_lowercase() || b == b'_');
    if !first_ok {
        return true;
    }
    if !bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'$') {
        return true;
    }
    RESERVED_KEYWORDS.contains(name)
}

/// Quote an identifier only when required.
pub fn quote_identifier(name: &str) -> Cow<'_, str> {
    if needs_quoting(name) {
        Cow::Owned(format!("\"{}\"", name.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(name)
    }
}

/// Resolve one name part: quoted parts lose their quotes (with `""`
/// collapsed), unquoted parts are folded to lower case.
pub fn normalize_identifier(part: &str) -> String {
    let part = part.trim();
    if part.len() >= 2 && part.starts_with('"') && part.ends_with('"') {
        part[1..part.len() - 1].replace("\"\"", "\"")
    } else {
        part.to_ascii_lowercase()
    }
}

/// Remove surrounding double quotes from every part of a name without
/// otherwise changing it.
pub fn strip_quotes(name: &str) -> String {
    split_qualified_name(name)
        .iter()
        .map(|part| {
            let part = part.trim();
            if part.len() >= 2 && part.starts_with('"') && part.ends_with('"') {
                part[1..part.len() - 1].replace("\"\"", "\"")
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Split a possibly qualified name on dots that are outside double quotes.
pub fn split_qualified_name(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, b) in name.bytes().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'.' if !in_quotes => {
                parts.push(&name[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&name[start..]);
    parts
}

/// Whether the name has a dot outside double quotes.
pub fn is_qualified(name: &str) -> bool {
    split_qualified_name(name).len() > 1
}
