//! Base token parser over the PostgreSQL tokenizer.
//!
//! Wraps a token stream and a cursor, and provides the navigation and
//! checking helpers the statement-level scanners in this module share.
//! Specialized scanners hold a `TokenParser` and delegate to it:
//!
//! ```ignore
//! let mut base = TokenParser::new(sql)?;
//! base.skip_whitespace();
//! if !base.check_keyword(Keyword::CREATE) {
//!     return None;
//! }
//! ```

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer};

use crate::util::location_to_offset;

/// Token stream with a cursor, tied to the source it was read from so that
/// token positions can be mapped back to byte offsets.
pub struct TokenParser<'a> {
    sql: &'a str,
    tokens: Vec<TokenWithSpan>,
    pos: usize,
}

impl<'a> TokenParser<'a> {
    /// Tokenize `sql` with the PostgreSQL dialect. Returns `None` if
    /// tokenization fails (e.g. an unterminated string).
    pub fn new(sql: &'a str) -> Option<Self> {
        let dialect = PostgreSqlDialect {};
        let tokens = Tokenizer::new(&dialect, sql)
            .tokenize_with_location()
            .ok()?;

        Some(Self {
            sql,
            tokens,
            pos: 0,
        })
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn tokens(&self) -> &[TokenWithSpan] {
        &self.tokens
    }

    /// Byte offset in the source where the token at `index` starts.
    pub fn start_offset(&self, index: usize) -> usize {
        match self.tokens.get(index) {
            Some(token) => location_to_offset(self.sql, token.span.start),
            None => self.sql.len(),
        }
    }

    /// Byte offset in the source just past the token at `index`.
    pub fn end_offset(&self, index: usize) -> usize {
        match self.tokens.get(index) {
            Some(token) => location_to_offset(self.sql, token.span.end),
            None => self.sql.len(),
        }
    }

    // ========================================================================
    // Token access
    // ========================================================================

    #[inline]
    pub fn current_token(&self) -> Option<&TokenWithSpan> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Skip whitespace and comment tokens.
    pub fn skip_whitespace(&mut self) {
        while let Some(token) = self.current_token() {
            match &token.token {
                Token::Whitespace(_) => self.advance(),
                _ => break,
            }
        }
    }

    // ========================================================================
    // Token type checks
    // ========================================================================

    #[inline]
    pub fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.current_token(), Some(t) if matches!(&t.token, Token::Word(w) if w.keyword == keyword))
    }

    /// Case-insensitive word check, for words sqlparser has no keyword for
    /// (e.g. `INOUT`, `EVENT_TRIGGER`).
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        matches!(self.current_token(), Some(t) if matches!(&t.token, Token::Word(w) if w.value.eq_ignore_ascii_case(word)))
    }

    /// Compare token types by discriminant, ignoring any inner value.
    #[inline]
    pub fn check_token(&self, expected: &Token) -> bool {
        match self.current_token() {
            Some(token) => std::mem::discriminant(&token.token) == std::mem::discriminant(expected),
            None => false,
        }
    }

    pub fn expect_keyword(&mut self, keyword: Keyword) -> Option<()> {
        if self.check_keyword(keyword) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    pub fn expect_token(&mut self, expected: &Token) -> Option<()> {
        if self.check_token(expected) {
            self.advance();
            Some(())
        } else {
            None
        }
    }
}
