//! Splitting of assignment leaves (`target := value`) into their two sides.
//!
//! A top-level `:=` always wins. Otherwise exactly one top-level `=` is
//! accepted as the operator; more than one is ambiguous and rejected rather
//! than guessed at. Operators nested inside parentheses or brackets (named
//! arguments, comparisons in subscripts) never count.

use sqlparser::tokenizer::Token;

use super::token_parser_base::TokenParser;
use crate::error::AssignmentSplitError;

/// The two trimmed sides of an assignment, borrowed from the leaf text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentParts<'a> {
    pub target: &'a str,
    pub value: &'a str,
}

/// Split an assignment leaf at its operator.
pub fn split_assignment(text: &str) -> Result<AssignmentParts<'_>, AssignmentSplitError> {
    let (start, end) = match TokenParser::new(text) {
        Some(parser) => operator_from_tokens(&parser)?,
        // Text the tokenizer rejects still gets a best-effort scan.
        None => operator_from_chars(text)?,
    };

    let target = text[..start].trim();
    let value = text[end..].trim();
    if target.is_empty() {
        return Err(AssignmentSplitError::EmptySide { side: "target" });
    }
    if value.is_empty() {
        return Err(AssignmentSplitError::EmptySide { side: "value" });
    }
    Ok(AssignmentParts { target, value })
}

/// Byte range of the operator, found on the token stream.
fn operator_from_tokens(parser: &TokenParser<'_>) -> Result<(usize, usize), AssignmentSplitError> {
    let tokens = parser.tokens();
    let mut depth = 0i32;
    let mut equals = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match &token.token {
            Token::LParen | Token::LBracket => depth += 1,
            Token::RParen | Token::RBracket => depth -= 1,
            Token::Assignment if depth == 0 => {
                return Ok((parser.start_offset(i), parser.end_offset(i)));
            }
            Token::Eq if depth == 0 => {
                let glued_before = i > 0
                    && matches!(
                        tokens[i - 1].token,
                        Token::Lt | Token::Gt | Token::ExclamationMark
                    );
                let glued_after = matches!(tokens.get(i + 1).map(|t| &t.token), Some(Token::Gt));
                if !glued_before && !glued_after {
                    equals.push(i);
                }
            }
            _ => {}
        }
    }

    match equals.as_slice() {
        [] => Err(AssignmentSplitError::NoOperator),
        [only] => Ok((parser.start_offset(*only), parser.end_offset(*only))),
        many => Err(AssignmentSplitError::Ambiguous { count: many.len() }),
    }
}

/// Same rules as [`operator_from_tokens`], on raw characters.
fn operator_from_chars(text: &str) -> Result<(usize, usize), AssignmentSplitError> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut equals = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                if bytes.get(i + 1) == Some(&q) {
                    i += 1;
                } else {
                    quote = None;
                }
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b'=') => return Ok((i, i + 2)),
            b'=' if depth == 0 => {
                let prev = if i > 0 { bytes[i - 1] } else { b' ' };
                let next = bytes.get(i + 1).copied().unwrap_or(b' ');
                if !matches!(prev, b'<' | b'>' | b'!' | b':' | b'=') && !matches!(next, b'>' | b'=') {
                    equals.push(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    match equals.as_slice() {
        [] => Err(AssignmentSplitError::NoOperator),
        [only] => Ok((*only, *only + 1)),
        many => Err(AssignmentSplitError::Ambiguous { count: many.len() }),
    }
}
