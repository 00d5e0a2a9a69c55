//! Runtime values

use std::fmt;

use bigdecimal::BigDecimal;

use super::{format_number, Unit};
use crate::ast::Name;

#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Number(BigDecimal),
    /// Result of a comparison
    Bool(bool),
    /// A declared function, as obtained by naming it without calling it
    FunctionRef(Name),
}

impl ValueKind {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Number(_) => "number",
            ValueKind::Bool(_) => "boolean",
            ValueKind::FunctionRef(_) => "function",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Number(n) => f.write_str(&format_number(n)),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::FunctionRef(name) => write!(f, "<function {name}>"),
        }
    }
}

/// A value together with its unit
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub kind: ValueKind,
    pub unit: Unit,
}

impl Value {
    #[must_use]
    pub fn number(n: impl Into<BigDecimal>, unit: Unit) -> Self {
        Self {
            kind: ValueKind::Number(n.into()),
            unit,
        }
    }

    #[must_use]
    pub fn dimensionless(n: impl Into<BigDecimal>) -> Self {
        Self::number(n, Unit::new())
    }

    #[must_use]
    pub fn boolean(b: bool) -> Self {
        Self {
            kind: ValueKind::Bool(b),
            unit: Unit::new(),
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<&BigDecimal> {
        match &self.kind {
            ValueKind::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.unit.is_dimensionless() {
            write!(f, " {}", self.unit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_unit() {
        let v = Value::number(5, Unit::new_named(Name::new("m")));
        assert_eq!(v.to_string(), "5 m");
        assert_eq!(Value::dimensionless(2).to_string(), "2");
        assert_eq!(Value::boolean(true).to_string(), "true");
        let f = Value {
            kind: ValueKind::FunctionRef(Name::new("area")),
            unit: Unit::new(),
        };
        assert_eq!(f.to_string(), "<function area>");
    }
}
