//! Lexer for natpl
//!
//! Turns source text into tokens with spans. Newlines are kept as tokens since
//! every line of a program is a separate item; `#` comments are trivia.

#![allow(clippy::cast_possible_truncation)] // We intentionally use u32 for spans

mod span;
mod token;

pub use span::{LineIndex, Location, Span};
pub use token::TokenKind;

use logos::Logos;
use thiserror::Error;

/// A token with its kind, span, and source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub lexeme: String,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, span: Span, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            lexeme: lexeme.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
}

/// A lexer error with location information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedError {
    pub error: LexError,
    pub span: Span,
}

impl std::fmt::Display for SpannedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.error, self.span)
    }
}

impl std::error::Error for SpannedError {}

pub struct Lexer<'source> {
    inner: logos::Lexer<'source, TokenKind>,
    errors: Vec<SpannedError>,
    finished: bool,
}

impl<'source> Lexer<'source> {
    #[must_use]
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            errors: Vec::new(),
            finished: false,
        }
    }

    /// Tokenize the entire source. The returned tokens always end with `Eof`.
    #[must_use]
    pub fn tokenize(source: &str) -> (Vec<Token>, Vec<SpannedError>) {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.by_ref().collect();
        (tokens, lexer.errors)
    }

    pub fn errors(&self) -> &[SpannedError] {
        &self.errors
    }

    fn eof(&self) -> Token {
        let end = self.inner.source().len() as u32;
        Token::new(TokenKind::Eof, Span::new(end, end), "")
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(Ok(kind)) => Some(Token::new(
                kind,
                Span::from(self.inner.span()),
                self.inner.slice(),
            )),
            Some(Err(())) => {
                // Error recovery: emit an error token and keep lexing
                let span = Span::from(self.inner.span());
                let slice = self.inner.slice();
                let c = slice.chars().next().unwrap_or('\u{FFFD}');
                self.errors.push(SpannedError {
                    error: LexError::UnexpectedChar(c),
                    span,
                });
                Some(Token::new(TokenKind::Error, span, slice))
            }
            None => {
                self.finished = true;
                Some(self.eof())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_keywords_and_names() {
        assert_eq!(
            lex_kinds("unit print units printer"),
            vec![
                TokenKind::Unit,
                TokenKind::Print,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(
            lex_kinds("42 1_000 3.25 1e3 2.5E-4"),
            vec![
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn number_followed_by_unit() {
        let (tokens, errors) = Lexer::tokenize("2km");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].lexeme, "2");
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].lexeme, "km");
    }

    #[test]
    fn lex_operators() {
        assert_eq!(
            lex_kinds("+ - * / % ^ = == != < > <= >="),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Caret,
                TokenKind::Eq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn newlines_and_comments() {
        assert_eq!(
            lex_kinds("unit m # metre\nx"),
            vec![
                TokenKind::Unit,
                TokenKind::Ident,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unicode_identifiers() {
        let (tokens, errors) = Lexer::tokenize("µs Ω");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].lexeme, "µs");
        assert_eq!(tokens[1].lexeme, "Ω");
    }

    #[test]
    fn spans_are_byte_offsets() {
        let (tokens, _) = Lexer::tokenize("x = 10");
        assert_eq!(tokens[0].span, Span::new(0, 1));
        assert_eq!(tokens[1].span, Span::new(2, 3));
        assert_eq!(tokens[2].span, Span::new(4, 6));
        assert_eq!(tokens[3].span, Span::new(6, 6));
    }

    #[test]
    fn error_recovery_continues() {
        let (tokens, errors) = Lexer::tokenize("1 $ 2");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error, LexError::UnexpectedChar('$'));
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Error,
                TokenKind::Int,
                TokenKind::Eof
            ]
        );
    }
}
