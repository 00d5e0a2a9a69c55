//! Evaluation of natpl programs
//!
//! The [`Runtime`] holds every unit, variable and function declared so far.
//! Lines are evaluated one at a time; a `NAME = expr` line declares `NAME` when
//! it is new and tests equality when it is already defined.

mod error;
mod eval;

pub use error::{EvalError, ItemError, ProgramError, UnitError};
pub use eval::{MAX_CALL_DEPTH, MAX_EXPONENT};

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, trace};

use crate::ast::{Expr, Item, LineItem, Name};
use crate::parser::Parser;
use crate::term::{Unit, Value, ValueKind};

/// Significant digits kept by division unless configured otherwise
pub const DEFAULT_PRECISION: u64 = 50;

/// Upper bound for the division precision; quotients are computed to 100 digits
pub const MAX_PRECISION: u64 = 100;

/// A declared function: parameter names and an unevaluated body
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub params: Vec<Name>,
    pub body: Expr,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.params.iter().map(Name::as_str).collect();
        write!(f, "({}) = {}", params.join(", "), self.body)
    }
}

/// What evaluating one line produced
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    Empty,
    Value(Value),
    /// A `print` line: the expression as written and its value
    PrintValue(Expr, Value),
}

#[derive(Debug)]
pub struct Runtime {
    units: HashSet<Name>,
    variables: HashMap<Name, Value>,
    functions: HashMap<Name, Function>,
    precision: u64,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    #[must_use]
    pub fn new() -> Self {
        Self::with_precision(DEFAULT_PRECISION)
    }

    /// A runtime rounding quotients to `precision` significant digits
    /// (clamped to `1..=MAX_PRECISION`)
    #[must_use]
    pub fn with_precision(precision: u64) -> Self {
        Self {
            units: HashSet::new(),
            variables: HashMap::new(),
            functions: HashMap::new(),
            precision: precision.clamp(1, MAX_PRECISION),
        }
    }

    #[must_use]
    pub fn precision(&self) -> u64 {
        self.precision
    }

    pub fn set_precision(&mut self, precision: u64) {
        self.precision = precision.clamp(1, MAX_PRECISION);
    }

    /// Parse and evaluate a whole program. Nothing is evaluated if any line
    /// fails to parse; evaluation stops at the first failing line.
    pub fn eval_source(&mut self, source: &str) -> Result<Vec<EvalResult>, ProgramError> {
        let items = Parser::parse_program(source).map_err(ProgramError::Parse)?;
        debug!(lines = items.len(), "evaluating program");

        let mut results = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let line = index + 1;
            trace!(line, %item, "evaluating line");
            let result = self
                .eval_line_item(item)
                .map_err(|error| ProgramError::Runtime { line, error })?;
            results.push(result);
        }
        Ok(results)
    }

    pub fn eval_line_item(&mut self, item: LineItem) -> Result<EvalResult, ItemError> {
        match self.line_item_to_item(item) {
            Some(item) => self.eval_item(item),
            None => Ok(EvalResult::Empty),
        }
    }

    /// Resolve what a line means given the names defined so far
    pub fn line_item_to_item(&self, item: LineItem) -> Option<Item> {
        let item = match item {
            LineItem::Empty => return None,
            LineItem::UnitDeclaration(span, name) => Item::UnitDeclaration(span, name),
            LineItem::MaybeDeclarationOrEquality(decl) => {
                if self.is_defined(decl.declaration_name()) {
                    decl.into_expression()
                } else {
                    decl.into_declaration()
                }
            }
            LineItem::PrintedExpression(span, expr) => Item::PrintedExpression(span, expr),
            LineItem::SilentExpression(expr) => Item::SilentExpression(expr),
        };
        Some(item)
    }

    pub fn eval_item(&mut self, item: Item) -> Result<EvalResult, ItemError> {
        use std::collections::hash_map::Entry;

        match item {
            Item::UnitDeclaration(span, name) => {
                if !self.units.insert(name.name.clone()) {
                    return Err(ItemError::UnitRedeclared(span, name.name));
                }
                debug!(unit = %name, "declared unit");
                Ok(EvalResult::Empty)
            }
            Item::VariableDeclaration { span, name, rhs } => {
                let value = self.eval_expr(&rhs)?;
                match self.variables.entry(name.name) {
                    Entry::Occupied(entry) => {
                        Err(ItemError::VariableRedefined(span, entry.key().clone()))
                    }
                    Entry::Vacant(entry) => {
                        debug!(variable = %entry.key(), %value, "declared variable");
                        let value = entry.insert(value).clone();
                        Ok(EvalResult::Value(value))
                    }
                }
            }
            Item::FunctionDeclaration {
                span,
                name,
                params,
                rhs,
            } => match self.functions.entry(name.name) {
                Entry::Occupied(entry) => {
                    Err(ItemError::FunctionRedefined(span, entry.key().clone()))
                }
                Entry::Vacant(entry) => {
                    debug!(function = %entry.key(), arity = params.len(), "declared function");
                    entry.insert(Function {
                        params: params.into_iter().map(|p| p.name).collect(),
                        body: rhs,
                    });
                    Ok(EvalResult::Empty)
                }
            },
            Item::PrintedExpression(_, expr) => {
                let value = self.eval_expr(&expr)?;
                Ok(EvalResult::PrintValue(expr, value))
            }
            Item::SilentExpression(expr) => {
                let value = self.eval_expr(&expr)?;
                Ok(EvalResult::Value(value))
            }
        }
    }

    #[must_use]
    pub fn is_defined(&self, name: &Name) -> bool {
        self.units.contains(name)
            || self.variables.contains_key(name)
            || self.functions.contains_key(name)
    }

    /// Value of a global name: variables, then units (as `1 unit`), then functions
    #[must_use]
    pub fn lookup(&self, name: &Name) -> Option<Value> {
        if let Some(value) = self.variables.get(name) {
            Some(value.clone())
        } else if self.units.contains(name) {
            Some(Value::number(1, Unit::new_named(name.clone())))
        } else if self.functions.contains_key(name) {
            Some(Value {
                kind: ValueKind::FunctionRef(name.clone()),
                unit: Unit::new(),
            })
        } else {
            None
        }
    }

    /// Declared units, sorted by name
    #[must_use]
    pub fn units(&self) -> Vec<&Name> {
        let mut units: Vec<_> = self.units.iter().collect();
        units.sort();
        units
    }

    /// Declared variables, sorted by name
    #[must_use]
    pub fn variables(&self) -> Vec<(&Name, &Value)> {
        let mut variables: Vec<_> = self.variables.iter().collect();
        variables.sort_by(|a, b| a.0.cmp(b.0));
        variables
    }

    /// Declared functions, sorted by name
    #[must_use]
    pub fn functions(&self) -> Vec<(&Name, &Function)> {
        let mut functions: Vec<_> = self.functions.iter().collect();
        functions.sort_by(|a, b| a.0.cmp(b.0));
        functions
    }
}
