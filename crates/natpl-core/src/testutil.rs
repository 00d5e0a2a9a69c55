//! Test utilities for natpl
//!
//! Helpers that run a whole program and inspect the value of its last line.

use crate::runtime::{EvalResult, Runtime};
use crate::term::{format_number, Value, ValueKind};

/// Result type for test helpers
pub type TestResult<T> = Result<T, String>;

/// Run a program in a fresh runtime and return the value of its last line
///
/// # Errors
/// Returns error if parsing or evaluation fails, or the last line has no value
pub fn eval_program(source: &str) -> TestResult<Value> {
    let mut runtime = Runtime::new();
    eval_in(&mut runtime, source)
}

/// Run a program in an existing runtime and return the value of its last line
///
/// # Errors
/// Returns error if parsing or evaluation fails, or the last line has no value
pub fn eval_in(runtime: &mut Runtime, source: &str) -> TestResult<Value> {
    let results = runtime.eval_source(source).map_err(|e| match e {
        crate::runtime::ProgramError::Parse(errors) => {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            format!("Parse error: {}", messages.join("; "))
        }
        other => format!("Runtime error: {other}"),
    })?;
    match results.into_iter().last() {
        Some(EvalResult::Value(value) | EvalResult::PrintValue(_, value)) => Ok(value),
        Some(EvalResult::Empty) | None => Err("Last line produced no value".to_string()),
    }
}

/// Run a program and render the last value the way the CLI prints it
///
/// # Errors
/// Returns error if evaluation fails
pub fn eval_display(source: &str) -> TestResult<String> {
    eval_program(source).map(|value| value.to_string())
}

/// Run a program and expect a number as the last value, rendered plainly
///
/// # Errors
/// Returns error if evaluation fails or the result is not a number
pub fn eval_number(source: &str) -> TestResult<String> {
    let value = eval_program(source)?;
    match &value.kind {
        ValueKind::Number(n) => Ok(format_number(n)),
        other => Err(format!("Expected number, got {}", other.type_name())),
    }
}

/// Run a program and expect a boolean as the last value
///
/// # Errors
/// Returns error if evaluation fails or the result is not a boolean
pub fn eval_bool(source: &str) -> TestResult<bool> {
    match eval_program(source)?.kind {
        ValueKind::Bool(b) => Ok(b),
        other => Err(format!("Expected boolean, got {}", other.type_name())),
    }
}

/// Run a program that is expected to fail and return the error message
///
/// # Errors
/// Returns error if the program runs successfully
pub fn eval_error(source: &str) -> TestResult<String> {
    match eval_program(source) {
        Ok(value) => Err(format!("Expected an error, got {value}")),
        Err(message) => Ok(message),
    }
}
