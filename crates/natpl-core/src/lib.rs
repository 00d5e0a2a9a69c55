//! natpl Core - Language engine for natpl, a calculator language with units
//!
//! This crate provides the core functionality:
//! - Lexer: Tokenization of source lines
//! - AST: Line items and expressions
//! - Parser: AST construction from the token stream
//! - Terms: Values and units
//! - Runtime: Declarations and evaluation

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lexer module - tokenization of natpl source
pub mod lexer;

/// Abstract Syntax Tree - parsed representation of natpl lines
pub mod ast;

/// Parser module - converts tokens into line items
pub mod parser;

/// Values and units
pub mod term;

/// Runtime module - declarations and expression evaluation
pub mod runtime;

/// Test utilities - helpers for testing natpl programs
pub mod testutil;

/// Convenience re-export of lexer
pub use lexer::Lexer;

/// Convenience re-export of parser
pub use parser::Parser;

/// Convenience re-export of runtime
pub use runtime::{EvalResult, Runtime};
