//! Placement of an `INTO target` clause inside stored SQL text.
//!
//! The procedural parser stores a `SELECT ... INTO x FROM ...` statement with
//! the `INTO` removed, so rendering has to put it back. The scanner walks the
//! PostgreSQL token stream once, tracking parenthesis depth, and only ever
//! considers bare keywords at depth zero. A `FROM` inside a subquery in the
//! select list is therefore never mistaken for the outer one, and neither is
//! a keyword used as a qualified column name (`p.limit`).

use sqlparser::tokenizer::Token;

use super::token_parser_base::TokenParser;
use crate::constants::{DML_KEYWORDS, INTO_BOUNDARY_KEYWORDS};
use crate::util::is_ident_byte;

/// Where an `INTO` clause belongs in a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPoint {
    /// Byte offset to insert at
    At(usize),
    /// The statement already carries its own top-level `INTO`
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Undecided,
    Select,
    Dml { after_returning: bool },
}

/// What a top-level keyword means for the clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Boundary,
    AlreadyPresent,
}

/// Keyword state shared by the token and character scanners.
struct ClauseScan {
    depth: i32,
    mode: Mode,
}

impl ClauseScan {
    fn new() -> Self {
        Self {
            depth: 0,
            mode: Mode::Undecided,
        }
    }

    /// Feed one bare word. Words nested in parentheses never count.
    fn word(&mut self, word: &str) -> Step {
        if self.depth != 0 {
            return Step::Continue;
        }
        match self.mode {
            Mode::Undecided => {
                if word.eq_ignore_ascii_case("SELECT") || word.eq_ignore_ascii_case("VALUES") {
                    self.mode = Mode::Select;
                } else if DML_KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k)) {
                    self.mode = Mode::Dml {
                        after_returning: false,
                    };
                }
            }
            Mode::Select => {
                if word.eq_ignore_ascii_case("INTO") {
                    return Step::AlreadyPresent;
                }
                if INTO_BOUNDARY_KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k)) {
                    return Step::Boundary;
                }
            }
            Mode::Dml { after_returning } => {
                if word.eq_ignore_ascii_case("RETURNING") {
                    self.mode = Mode::Dml {
                        after_returning: true,
                    };
                } else if after_returning && word.eq_ignore_ascii_case("INTO") {
                    return Step::AlreadyPresent;
                }
            }
        }
        Step::Continue
    }
}

/// Find where `INTO` goes in `sql`.
///
/// Queries get it right before the first top-level clause keyword that ends
/// the select list (or at the end when there is none). Data-modifying
/// statements get it at the end, after any `RETURNING` list.
pub fn find_into_position(sql: &str) -> InsertionPoint {
    match TokenParser::new(sql) {
        Some(parser) => position_from_tokens(sql, &parser),
        // Text the tokenizer rejects still gets a best-effort scan.
        None => position_from_chars(sql),
    }
}

fn position_from_tokens(sql: &str, parser: &TokenParser<'_>) -> InsertionPoint {
    let mut scan = ClauseScan::new();
    let mut after_period = false;

    for (i, token) in parser.tokens().iter().enumerate() {
        match &token.token {
            Token::Whitespace(_) => continue,
            Token::LParen => scan.depth += 1,
            Token::RParen => scan.depth -= 1,
            // Quoted identifiers and names after a `.` are never keywords
            Token::Word(w) if w.quote_style.is_none() && !after_period => match scan.word(&w.value) {
                Step::Continue => {}
                Step::AlreadyPresent => return InsertionPoint::AlreadyPresent,
                Step::Boundary => {
                    let start = parser.start_offset(i);
                    return InsertionPoint::At(sql[..start].trim_end().len());
                }
            },
            _ => {}
        }
        after_period = token.token == Token::Period;
    }

    InsertionPoint::At(sql.trim_end().len())
}

/// Same rules as [`position_from_tokens`], on raw bytes.
fn position_from_chars(sql: &str) -> InsertionPoint {
    let bytes = sql.as_bytes();
    let mut scan = ClauseScan::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' => {
                let escapes = i > 0
                    && matches!(bytes[i - 1], b'E' | b'e')
                    && (i < 2 || !is_ident_byte(bytes[i - 2]));
                i = skip_quoted(bytes, i, b'\'', escapes);
                continue;
            }
            b'"' => {
                i = skip_quoted(bytes, i, b'"', false);
                continue;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = bytes[i..]
                    .iter()
                    .position(|&c| c == b'\n')
                    .map_or(bytes.len(), |p| i + p + 1);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
                continue;
            }
            b'$' if i == 0 || !is_ident_byte(bytes[i - 1]) => {
                if let Some(next) = skip_dollar_quoted(sql, i) {
                    i = next;
                    continue;
                }
            }
            b'(' => scan.depth += 1,
            b')' => scan.depth -= 1,
            _ => {}
        }

        let at_word_start = (b.is_ascii_alphabetic() || b == b'_') && (i == 0 || !is_ident_byte(bytes[i - 1]));
        if !at_word_start {
            i += 1;
            continue;
        }

        let word_end = bytes[i..]
            .iter()
            .position(|&c| !is_ident_byte(c))
            .map_or(bytes.len(), |p| i + p);
        if !sql[..i].trim_end().ends_with('.') {
            match scan.word(&sql[i..word_end]) {
                Step::Continue => {}
                Step::AlreadyPresent => return InsertionPoint::AlreadyPresent,
                Step::Boundary => return InsertionPoint::At(sql[..i].trim_end().len()),
            }
        }
        i = word_end;
    }

    InsertionPoint::At(sql.trim_end().len())
}

/// Insert `clause` (e.g. `INTO STRICT v_total`) into `sql`.
pub fn insert_into_clause(sql: &str, clause: &str) -> String {
    match find_into_position(sql) {
        InsertionPoint::AlreadyPresent => sql.to_string(),
        InsertionPoint::At(pos) => {
            let (prefix, rest) = sql.split_at(pos);
            let rest = rest.trim();
            if rest.is_empty() {
                format!("{} {}", prefix.trim_end(), clause)
            } else {
                format!("{} {} {}", prefix.trim_end(), clause, rest)
            }
        }
    }
}

/// Skip a `'...'` or `"..."` run starting at `start`, honoring doubled quotes
/// and (for `E'...'` strings) backslash escapes. Returns the index just past it.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8, backslash_escapes: bool) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if backslash_escapes && b == b'\\' {
            i += 2;
            continue;
        }
        if b == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Skip a (possibly nested) block comment starting at `start`.
fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut nesting = 0;
    let mut i = start;
    while i < bytes.len() {
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            nesting += 1;
            i += 2;
        } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
            nesting -= 1;
            i += 2;
            if nesting == 0 {
                return i;
            }
        } else {
            i += 1;
        }
    }
    bytes.len()
}

/// Skip a `$tag$ ... $tag$` body starting at `start`. Returns `None` when the
/// `$` does not open a dollar quote (e.g. a positional parameter `$1`).
fn skip_dollar_quoted(sql: &str, start: usize) -> Option<usize> {
    let bytes = sql.as_bytes();
    let mut i = start + 1;
    if let Some(&first) = bytes.get(i) {
        if first.is_ascii_digit() {
            return None;
        }
    }
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    if bytes.get(i) != Some(&b'$') {
        return None;
    }
    let tag = &sql[start..=i];
    let body_start = i + 1;
    Some(
        sql[body_start..]
            .find(tag)
            .map_or(bytes.len(), |p| body_start + p + tag.len()),
    )
}
