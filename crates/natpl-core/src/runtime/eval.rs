//! Expression evaluation

use std::cmp::Ordering;
use std::collections::HashMap;

use bigdecimal::{BigDecimal, One, ToPrimitive, Zero};
use tracing::trace;

use super::{EvalError, Runtime, UnitError};
use crate::ast::{Expr, ExprKind, InfixOp, Name, PrefixOp, SiPrefix, Span};
use crate::term::{self, Unit, Value, ValueKind};

/// Maximum nesting of function calls
pub const MAX_CALL_DEPTH: usize = 256;

/// Largest magnitude accepted for an integer exponent
pub const MAX_EXPONENT: i64 = 100_000;

/// Names visible while evaluating: the parameters of the function being
/// evaluated, if any, over the runtime's globals
#[derive(Clone, Copy, Default)]
struct Scope<'a> {
    locals: Option<&'a HashMap<Name, Value>>,
    depth: usize,
}

impl Runtime {
    /// Evaluate an expression against the current globals
    pub fn eval_expr(&self, expr: &Expr) -> Result<Value, EvalError> {
        self.eval_in(expr, Scope::default())
    }

    fn lookup_in(&self, name: &Name, scope: Scope<'_>) -> Option<Value> {
        scope
            .locals
            .and_then(|locals| locals.get(name).cloned())
            .or_else(|| self.lookup(name))
    }

    fn eval_in(&self, expr: &Expr, scope: Scope<'_>) -> Result<Value, EvalError> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::dimensionless(n.clone())),

            ExprKind::Variable(name) => self
                .lookup_in(name, scope)
                .ok_or_else(|| EvalError::UndefinedName(expr.span, name.clone())),

            ExprKind::MaybeUnitPrefix {
                name,
                full_name,
                prefix,
            } => {
                if let Some(value) = self.lookup_in(full_name, scope) {
                    return Ok(value);
                }
                match self.lookup_in(name, scope) {
                    Some(value) => apply_si_prefix(expr.span, *prefix, value),
                    None => Err(EvalError::UndefinedName(expr.span, full_name.clone())),
                }
            }

            ExprKind::Call { base, args } => self.eval_call(expr.span, base, args, scope),

            ExprKind::Prefix { op, expr: operand } => {
                let value = self.eval_in(operand, scope)?;
                apply_prefix(expr.span, *op, value)
            }

            ExprKind::Infix { op, lhs, rhs } => {
                let lhs = self.eval_in(lhs, scope)?;
                let rhs = self.eval_in(rhs, scope)?;
                self.eval_infix(expr.span, *op, lhs, rhs)
            }

            ExprKind::UnitOf(inner) => {
                let value = self.eval_in(inner, scope)?;
                Ok(Value::number(1, value.unit))
            }

            ExprKind::Parenthesised(inner) => self.eval_in(inner, scope),
        }
    }

    fn eval_call(
        &self,
        span: Span,
        base: &Expr,
        args: &[Expr],
        scope: Scope<'_>,
    ) -> Result<Value, EvalError> {
        let callee = self.eval_in(base, scope)?;
        let name = match &callee.kind {
            ValueKind::FunctionRef(name) => name,
            _ => return Err(EvalError::NotCallable(span, callee)),
        };
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| EvalError::UndefinedName(span, name.clone()))?;

        if function.params.len() != args.len() {
            return Err(EvalError::ArityMismatch {
                span,
                name: name.clone(),
                expected: function.params.len(),
                found: args.len(),
            });
        }
        if scope.depth >= MAX_CALL_DEPTH {
            return Err(EvalError::RecursionLimit(span));
        }

        let mut locals = HashMap::with_capacity(args.len());
        for (param, arg) in function.params.iter().zip(args) {
            locals.insert(param.clone(), self.eval_in(arg, scope)?);
        }
        trace!(function = %name, depth = scope.depth + 1, "call");

        self.eval_in(
            &function.body,
            Scope {
                locals: Some(&locals),
                depth: scope.depth + 1,
            },
        )
    }

    fn eval_infix(
        &self,
        span: Span,
        op: InfixOp,
        lhs: Value,
        rhs: Value,
    ) -> Result<Value, EvalError> {
        let unit = infix_unit(span, op, &lhs, &rhs)?;

        let kind = match (&lhs.kind, &rhs.kind) {
            (ValueKind::Number(a), ValueKind::Number(b)) => {
                Some(self.number_infix(span, op, a, b, &lhs, &rhs)?)
            }
            (ValueKind::Bool(a), ValueKind::Bool(b)) => match op {
                InfixOp::Eq => Some(ValueKind::Bool(a == b)),
                InfixOp::Neq => Some(ValueKind::Bool(a != b)),
                _ => None,
            },
            _ => None,
        };

        match kind {
            Some(kind) => Ok(Value { kind, unit }),
            None => Err(EvalError::InvalidInfixOperator(span, op, lhs, rhs)),
        }
    }

    fn number_infix(
        &self,
        span: Span,
        op: InfixOp,
        a: &BigDecimal,
        b: &BigDecimal,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<ValueKind, EvalError> {
        let kind = match op {
            InfixOp::Add => ValueKind::Number(a + b),
            InfixOp::Sub => ValueKind::Number(a - b),
            InfixOp::Mul => ValueKind::Number(a * b),
            InfixOp::Div => {
                if b.is_zero() {
                    return Err(EvalError::DivisionByZero(span));
                }
                ValueKind::Number((a / b).with_prec(self.precision))
            }
            InfixOp::Mod => {
                if b.is_zero() {
                    return Err(EvalError::DivisionByZero(span));
                }
                ValueKind::Number(a % b)
            }
            InfixOp::Pow => {
                let exp = integer_exponent(span, lhs, rhs)?;
                ValueKind::Number(self.pow(span, a, exp)?)
            }
            InfixOp::Eq => ValueKind::Bool(a == b),
            InfixOp::Neq => ValueKind::Bool(a != b),
            InfixOp::Lt => ValueKind::Bool(a.cmp(b) == Ordering::Less),
            InfixOp::Le => ValueKind::Bool(a.cmp(b) != Ordering::Greater),
            InfixOp::Gt => ValueKind::Bool(a.cmp(b) == Ordering::Greater),
            InfixOp::Ge => ValueKind::Bool(a.cmp(b) != Ordering::Less),
        };
        if let ValueKind::Number(n) = &kind {
            if !term::within_digit_limit(n) {
                return Err(EvalError::NumberTooLarge(span));
            }
        }
        Ok(kind)
    }

    /// `base^exp` by repeated squaring; negative exponents divide at the
    /// configured precision. Refused up front when the exact power could
    /// need more than `MAX_DIGITS` digits.
    fn pow(&self, span: Span, base: &BigDecimal, exp: i64) -> Result<BigDecimal, EvalError> {
        if term::digit_span(base).saturating_mul(exp.unsigned_abs()) > term::MAX_DIGITS {
            return Err(EvalError::NumberTooLarge(span));
        }

        let mut remaining = exp.unsigned_abs();
        let mut square = base.clone();
        let mut result = BigDecimal::one();
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = &result * &square;
            }
            remaining >>= 1;
            if remaining > 0 {
                square = &square * &square;
            }
        }

        if exp >= 0 {
            Ok(result)
        } else if result.is_zero() {
            Err(EvalError::DivisionByZero(span))
        } else {
            Ok((BigDecimal::one() / result).with_prec(self.precision))
        }
    }
}

/// Unit of `lhs op rhs`, checked before the values themselves
fn infix_unit(span: Span, op: InfixOp, lhs: &Value, rhs: &Value) -> Result<Unit, EvalError> {
    let incompatible =
        || UnitError::IncompatibleUnits(span, op, lhs.unit.clone(), rhs.unit.clone());

    match op {
        InfixOp::Mul => lhs
            .unit
            .multiply(&rhs.unit)
            .ok_or_else(|| UnitError::ExponentOverflow(span).into()),
        InfixOp::Div => lhs
            .unit
            .divide(&rhs.unit)
            .ok_or_else(|| UnitError::ExponentOverflow(span).into()),
        InfixOp::Add | InfixOp::Sub | InfixOp::Mod => {
            if lhs.unit == rhs.unit {
                Ok(lhs.unit.clone())
            } else {
                Err(incompatible().into())
            }
        }
        InfixOp::Pow => {
            if !rhs.unit.is_dimensionless() {
                return Err(incompatible().into());
            }
            if lhs.unit.is_dimensionless() {
                return Ok(Unit::new());
            }
            let exp = integer_exponent(span, lhs, rhs)?;
            lhs.unit
                .pow(exp)
                .ok_or_else(|| UnitError::ExponentOverflow(span).into())
        }
        InfixOp::Eq | InfixOp::Neq | InfixOp::Lt | InfixOp::Le | InfixOp::Gt | InfixOp::Ge => {
            if lhs.unit == rhs.unit {
                Ok(Unit::new())
            } else {
                Err(incompatible().into())
            }
        }
    }
}

/// The exponent of `lhs ^ rhs` as a machine integer
fn integer_exponent(span: Span, lhs: &Value, rhs: &Value) -> Result<i64, EvalError> {
    let n = match &rhs.kind {
        ValueKind::Number(n) if n.is_integer() => n,
        kind => {
            return Err(UnitError::InvalidPowerValue(span, lhs.unit.clone(), kind.clone()).into())
        }
    };
    match n.to_i64() {
        Some(exp) if exp.abs() <= MAX_EXPONENT => Ok(exp),
        _ => Err(EvalError::ExponentTooLarge(span, n.clone())),
    }
}

fn apply_prefix(span: Span, op: PrefixOp, value: Value) -> Result<Value, EvalError> {
    match value.kind {
        ValueKind::Number(n) => {
            let n = match op {
                PrefixOp::Pos => n,
                PrefixOp::Neg => -n,
            };
            Ok(Value::number(n, value.unit))
        }
        kind => Err(EvalError::InvalidPrefixOperator(
            span,
            op,
            Value {
                kind,
                unit: value.unit,
            },
        )),
    }
}

fn apply_si_prefix(span: Span, prefix: SiPrefix, value: Value) -> Result<Value, EvalError> {
    match value.kind {
        ValueKind::Number(n) => Ok(Value::number(n * prefix.factor(), value.unit)),
        kind => Err(EvalError::InvalidSiPrefix(
            span,
            prefix,
            Value {
                kind,
                unit: value.unit,
            },
        )),
    }
}
