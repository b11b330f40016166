//! Token-based helpers for `CREATE FUNCTION` / `CREATE PROCEDURE` text.
//!
//! ## Supported Syntax
//!
//! ```sql
//! CREATE [OR REPLACE] FUNCTION name(args) RETURNS type ... AS $$ body $$
//! CREATE [OR REPLACE] PROCEDURE name(args) ... AS 'body'
//! ```
//!
//! Only the outer signature is inspected: the return clause classifies what
//! an empty `RETURN` must look like, and the body literal after `AS` can be
//! pulled out or replaced.

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;

use super::token_parser_base::TokenParser;
use crate::deparser::ReturnKind;

/// Classify the return clause of a `CREATE FUNCTION`/`CREATE PROCEDURE`
/// statement. Returns `None` when the text is not such a statement.
pub fn parse_return_kind(sql: &str) -> Option<ReturnKind> {
    let mut base = TokenParser::new(sql)?;
    let is_procedure = parse_create_header(&mut base)?;

    // Name, up to the argument list
    while !base.is_at_end() && !base.check_token(&Token::LParen) {
        base.advance();
    }
    let has_out_args = scan_arguments(&mut base);

    if is_procedure {
        return Some(ReturnKind::Void);
    }

    base.skip_whitespace();
    if base.expect_keyword(Keyword::RETURNS).is_none() {
        return Some(if has_out_args {
            ReturnKind::OutParams
        } else {
            ReturnKind::Void
        });
    }
    base.skip_whitespace();

    if base.check_word_ci("SETOF") || base.check_keyword(Keyword::TABLE) {
        return Some(ReturnKind::Setof);
    }
    if has_out_args {
        return Some(ReturnKind::OutParams);
    }

    // Last part of a possibly qualified type name
    let mut type_name = None;
    while let Some(token) = base.current_token() {
        match &token.token {
            Token::Word(w) => {
                type_name = Some(w.value.to_ascii_lowercase());
                base.advance();
                if base.check_token(&Token::Period) {
                    base.advance();
                    continue;
                }
                break;
            }
            _ => break,
        }
    }

    Some(match type_name.as_deref() {
        Some("void") => ReturnKind::Void,
        Some("trigger") | Some("event_trigger") => ReturnKind::Trigger,
        _ => ReturnKind::Scalar,
    })
}

/// Body literal after `AS`, with its quoting removed.
pub fn extract_function_body(sql: &str) -> Option<String> {
    let base = TokenParser::new(sql)?;
    let index = locate_body(&base)?;
    match &base.tokens()[index].token {
        Token::DollarQuotedString(quoted) => Some(quoted.value.clone()),
        Token::SingleQuotedString(text) => Some(text.clone()),
        _ => None,
    }
}

/// Substitute `body` for the statement's body literal. The new body is
/// dollar-quoted with a tag that does not occur inside it.
pub fn replace_function_body(sql: &str, body: &str) -> Option<String> {
    let base = TokenParser::new(sql)?;
    let index = locate_body(&base)?;
    let start = base.start_offset(index);
    let end = base.end_offset(index);
    let tag = dollar_tag_for(body);
    Some(format!(
        "{}{}{}{}{}",
        &sql[..start],
        tag,
        body,
        tag,
        &sql[end..]
    ))
}

/// Pick the first of `$$`, `$body$`, `$body1$`, ... absent from `body`.
pub fn dollar_tag_for(body: &str) -> String {
    if !body.contains("$$") {
        return "$$".to_string();
    }
    let mut tag = "$body$".to_string();
    let mut n = 1;
    while body.contains(&tag) {
        tag = format!("$body{}$", n);
        n += 1;
    }
    tag
}

/// Consume `CREATE [OR REPLACE] FUNCTION|PROCEDURE`. Returns whether it was
/// a procedure.
fn parse_create_header(base: &mut TokenParser<'_>) -> Option<bool> {
    base.skip_whitespace();
    base.expect_keyword(Keyword::CREATE)?;
    base.skip_whitespace();

    if base.expect_keyword(Keyword::OR).is_some() {
        base.skip_whitespace();
        base.expect_keyword(Keyword::REPLACE)?;
        base.skip_whitespace();
    }

    if base.expect_keyword(Keyword::FUNCTION).is_some() {
        Some(false)
    } else if base.expect_keyword(Keyword::PROCEDURE).is_some() {
        Some(true)
    } else {
        None
    }
}

/// Walk the argument list; true if any argument is `OUT` or `INOUT`.
fn scan_arguments(base: &mut TokenParser<'_>) -> bool {
    if base.expect_token(&Token::LParen).is_none() {
        return false;
    }

    let mut has_out = false;
    let mut depth = 1;
    let mut at_arg_start = true;
    while !base.is_at_end() && depth > 0 {
        base.skip_whitespace();
        if at_arg_start && (base.check_word_ci("OUT") || base.check_word_ci("INOUT")) {
            has_out = true;
        }
        at_arg_start = false;
        if base.check_token(&Token::LParen) {
            depth += 1;
        } else if base.check_token(&Token::RParen) {
            depth -= 1;
        } else if depth == 1 && base.check_token(&Token::Comma) {
            at_arg_start = true;
        }
        base.advance();
    }
    has_out
}

/// Token index of the string literal following the first top-level `AS`
/// after the argument list.
fn locate_body(base: &TokenParser<'_>) -> Option<usize> {
    let tokens = base.tokens();
    let args_start = tokens.iter().position(|t| t.token == Token::LParen)?;
    let mut depth = 0i32;
    let mut i = args_start;

    while i < tokens.len() {
        match &tokens[i].token {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            Token::Word(w) if depth == 0 && w.keyword == Keyword::AS => {
                let literal = tokens[i + 1..]
                    .iter()
                    .position(|t| !matches!(t.token, Token::Whitespace(_)))
                    .map(|p| i + 1 + p)?;
                return match tokens[literal].token {
                    Token::DollarQuotedString(_) | Token::SingleQuotedString(_) => Some(literal),
                    _ => None,
                };
            }
            _ => {}
        }
        i += 1;
    }
    None
}
