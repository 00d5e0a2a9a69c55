//! Token kinds for the natpl lexer

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
pub enum TokenKind {
    // ========== Keywords ==========
    #[token("unit")]
    Unit,
    #[token("print")]
    Print,

    // ========== Literals ==========
    #[regex(r"[0-9][0-9_]*")]
    Int,

    /// Decimal literal, with or without an exponent
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9][0-9_]*)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9][0-9_]*")]
    Float,

    /// Names of units, variables and functions. Unicode letters are allowed so
    /// that `µs` and `Ω` can be declared.
    #[regex(r"[\p{XID_Start}_][\p{XID_Continue}]*")]
    Ident,

    // ========== Operators ==========
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,

    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    // ========== Delimiters ==========
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,

    // ========== Trivia ==========
    #[regex(r"#[^\n]*")]
    Comment,

    /// Lines are significant: one item per line
    #[token("\n")]
    Newline,

    // ========== Special ==========
    Eof,
    /// Produced for characters the lexer does not recognise
    Error,
}

impl TokenKind {
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Comment)
    }

    /// Tokens that may start an operand of implicit multiplication
    #[must_use]
    pub const fn starts_operand(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Float | Self::Ident | Self::LParen | Self::LBracket
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unit => "unit",
            Self::Print => "print",
            Self::Int => "integer",
            Self::Float => "number",
            Self::Ident => "identifier",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Caret => "^",
            Self::Eq => "=",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
            Self::Comment => "comment",
            Self::Newline => "newline",
            Self::Eof => "end of input",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}
