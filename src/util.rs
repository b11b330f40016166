//! Shared utility helpers.

use sqlparser::tokenizer::Location;

/// Case-insensitive starts_with check without allocating.
#[inline]
pub fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

/// Case-insensitive ends_with check without allocating.
#[inline]
pub fn ends_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[haystack.len() - needle.len()..]
            .eq_ignore_ascii_case(needle.as_bytes())
}

/// True for bytes that may continue an unquoted SQL identifier.
#[inline]
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// Strip a leading `SELECT` keyword (and the whitespace after it).
///
/// Returns the input unchanged when it does not start with `SELECT`.
pub fn strip_leading_select(text: &str) -> &str {
    let trimmed = text.trim_start();
    if starts_with_ci(trimmed, "SELECT")
        && trimmed
            .as_bytes()
            .get(6)
            .map_or(true, |b| !is_ident_byte(*b))
    {
        trimmed[6..].trim_start()
    } else {
        text
    }
}

/// Convert a tokenizer location (1-based line and character column) into a
/// byte offset within `text`.
pub fn location_to_offset(text: &str, location: Location) -> usize {
    let mut line = 1u64;
    let mut column = 1u64;
    for (offset, ch) in text.char_indices() {
        if line == location.line && column == location.column {
            return offset;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    text.len()
}
