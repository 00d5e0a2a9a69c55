//! Runtime error types

use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::ast::{InfixOp, Name, PrefixOp, SiPrefix, Span};
use crate::parser::ParseError;
use crate::term::{Unit, Value, ValueKind};

/// Failure to evaluate one line
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ItemError {
    #[error("unit redeclared: {1}")]
    UnitRedeclared(Span, Name),

    #[error("variable redefined: {1}")]
    VariableRedefined(Span, Name),

    #[error("function redefined: {1}")]
    FunctionRedefined(Span, Name),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ItemError {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            ItemError::UnitRedeclared(span, _)
            | ItemError::VariableRedefined(span, _)
            | ItemError::FunctionRedefined(span, _) => *span,
            ItemError::Eval(e) => e.span(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    #[error("undefined name: {1}")]
    UndefinedName(Span, Name),

    #[error("invalid prefix operator '{1}' on {2}")]
    InvalidPrefixOperator(Span, PrefixOp, Value),

    #[error("invalid operator '{1}' on {2} and {3}")]
    InvalidInfixOperator(Span, InfixOp, Value, Value),

    #[error("invalid SI prefix '{1}' on {2}")]
    InvalidSiPrefix(Span, SiPrefix, Value),

    #[error("division by zero")]
    DivisionByZero(Span),

    #[error("{1} is not a function")]
    NotCallable(Span, Value),

    #[error("function {name} takes {expected} argument(s), {found} given")]
    ArityMismatch {
        span: Span,
        name: Name,
        expected: usize,
        found: usize,
    },

    #[error("maximum call depth exceeded")]
    RecursionLimit(Span),

    #[error("exponent {1} is too large")]
    ExponentTooLarge(Span, BigDecimal),

    #[error("result has more than {} digits", crate::term::MAX_DIGITS)]
    NumberTooLarge(Span),

    #[error(transparent)]
    Unit(#[from] UnitError),
}

impl EvalError {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            EvalError::UndefinedName(span, _)
            | EvalError::InvalidPrefixOperator(span, ..)
            | EvalError::InvalidInfixOperator(span, ..)
            | EvalError::InvalidSiPrefix(span, ..)
            | EvalError::DivisionByZero(span)
            | EvalError::NotCallable(span, _)
            | EvalError::ArityMismatch { span, .. }
            | EvalError::RecursionLimit(span)
            | EvalError::ExponentTooLarge(span, _)
            | EvalError::NumberTooLarge(span) => *span,
            EvalError::Unit(e) => e.span(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UnitError {
    #[error("incompatible units ({2}) and ({3}) for operator '{1}'")]
    IncompatibleUnits(Span, InfixOp, Unit, Unit),

    #[error("invalid power on unit ({1}): {2}")]
    InvalidPowerValue(Span, Unit, ValueKind),

    #[error("unit exponent out of range")]
    ExponentOverflow(Span),
}

impl UnitError {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            UnitError::IncompatibleUnits(span, ..)
            | UnitError::InvalidPowerValue(span, ..)
            | UnitError::ExponentOverflow(span) => *span,
        }
    }
}

/// Failure to run a whole program
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProgramError {
    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),

    #[error("line {line}: {error}")]
    Runtime { line: usize, error: ItemError },
}
