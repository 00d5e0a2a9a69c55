//! Expression nodes and operators

use bigdecimal::BigDecimal;

use super::{Ident, Name, Span, Spanned};

/// SI prefixes that may be written in front of a declared name (`km`, `µs`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiPrefix {
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    Centi,
    Deci,
    Deca,
    Hecto,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
}

impl SiPrefix {
    /// Prefix symbols, two-letter symbols first so `da` wins over `d`
    const SYMBOLS: [(&'static str, SiPrefix); 15] = [
        ("da", SiPrefix::Deca),
        ("f", SiPrefix::Femto),
        ("p", SiPrefix::Pico),
        ("n", SiPrefix::Nano),
        ("u", SiPrefix::Micro),
        ("µ", SiPrefix::Micro),
        ("m", SiPrefix::Milli),
        ("c", SiPrefix::Centi),
        ("d", SiPrefix::Deci),
        ("h", SiPrefix::Hecto),
        ("k", SiPrefix::Kilo),
        ("M", SiPrefix::Mega),
        ("G", SiPrefix::Giga),
        ("T", SiPrefix::Tera),
        ("P", SiPrefix::Peta),
    ];

    /// Split `name` into a prefix and the remaining (non-empty) name
    #[must_use]
    pub fn split(name: &str) -> Option<(SiPrefix, &str)> {
        Self::SYMBOLS.iter().find_map(|&(symbol, prefix)| {
            name.strip_prefix(symbol)
                .filter(|rest| !rest.is_empty())
                .map(|rest| (prefix, rest))
        })
    }

    /// Power of ten this prefix stands for
    #[must_use]
    pub const fn exponent(self) -> i64 {
        match self {
            SiPrefix::Femto => -15,
            SiPrefix::Pico => -12,
            SiPrefix::Nano => -9,
            SiPrefix::Micro => -6,
            SiPrefix::Milli => -3,
            SiPrefix::Centi => -2,
            SiPrefix::Deci => -1,
            SiPrefix::Deca => 1,
            SiPrefix::Hecto => 2,
            SiPrefix::Kilo => 3,
            SiPrefix::Mega => 6,
            SiPrefix::Giga => 9,
            SiPrefix::Tera => 12,
            SiPrefix::Peta => 15,
        }
    }

    /// The prefix as an exact decimal factor, e.g. `0.001` for milli
    #[must_use]
    pub fn factor(self) -> BigDecimal {
        BigDecimal::new(1.into(), -self.exponent())
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            SiPrefix::Femto => "f",
            SiPrefix::Pico => "p",
            SiPrefix::Nano => "n",
            SiPrefix::Micro => "µ",
            SiPrefix::Milli => "m",
            SiPrefix::Centi => "c",
            SiPrefix::Deci => "d",
            SiPrefix::Deca => "da",
            SiPrefix::Hecto => "h",
            SiPrefix::Kilo => "k",
            SiPrefix::Mega => "M",
            SiPrefix::Giga => "G",
            SiPrefix::Tera => "T",
            SiPrefix::Peta => "P",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixOp {
    /// Unary plus (+)
    Pos,
    /// Negation (-)
    Neg,
}

impl PrefixOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PrefixOp::Pos => "+",
            PrefixOp::Neg => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Comparison
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl InfixOp {
    /// Binding power of the operator (higher = binds tighter)
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            InfixOp::Eq
            | InfixOp::Neq
            | InfixOp::Lt
            | InfixOp::Le
            | InfixOp::Gt
            | InfixOp::Ge => 1,
            InfixOp::Add | InfixOp::Sub => 2,
            InfixOp::Mul | InfixOp::Div | InfixOp::Mod => 3,
            InfixOp::Pow => 6,
        }
    }

    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            InfixOp::Eq | InfixOp::Neq | InfixOp::Lt | InfixOp::Le | InfixOp::Gt | InfixOp::Ge
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
            InfixOp::Pow => "^",
            InfixOp::Eq => "=",
            InfixOp::Neq => "!=",
            InfixOp::Lt => "<",
            InfixOp::Le => "<=",
            InfixOp::Gt => ">",
            InfixOp::Ge => ">=",
        }
    }
}

/// Precedence of implicit multiplication (`2 m`), tighter than `*` and `/`
pub const JUXTAPOSITION_PRECEDENCE: u8 = 4;

/// Precedence of prefix `+` and `-`; `^` still binds tighter so `-2^2 = -4`
pub const PREFIX_PRECEDENCE: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer or decimal literal
    Number(BigDecimal),

    Variable(Name),

    /// A name that also reads as an SI prefix followed by a name, e.g. `km`.
    /// Resolved at runtime: `full_name` wins if it is defined.
    MaybeUnitPrefix {
        name: Name,
        full_name: Name,
        prefix: SiPrefix,
    },

    Call {
        base: Box<Expr>,
        args: Vec<Expr>,
    },

    Prefix {
        op: PrefixOp,
        expr: Box<Expr>,
    },

    Infix {
        op: InfixOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// `[expr]`: the unit of a value, as `1 unit`
    UnitOf(Box<Expr>),

    Parenthesised(Box<Expr>),
}

impl Expr {
    #[must_use]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Expression for a written name, deciding whether it might carry an SI prefix
    #[must_use]
    pub fn name(ident: &Ident) -> Self {
        let kind = match SiPrefix::split(ident.name.as_str()) {
            Some((prefix, rest)) => ExprKind::MaybeUnitPrefix {
                name: Name::new(rest),
                full_name: ident.name.clone(),
                prefix,
            },
            None => ExprKind::Variable(ident.name.clone()),
        };
        Self::new(kind, ident.span)
    }

    #[must_use]
    pub fn infix(op: InfixOp, lhs: Expr, rhs: Expr) -> Self {
        let span = lhs.span.merge(rhs.span);
        Self::new(
            ExprKind::Infix {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    /// The name this expression refers to, if it is a bare name
    #[must_use]
    pub fn as_name(&self) -> Option<&Name> {
        match &self.kind {
            ExprKind::Variable(name) => Some(name),
            ExprKind::MaybeUnitPrefix { full_name, .. } => Some(full_name),
            _ => None,
        }
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_prefixes() {
        assert_eq!(SiPrefix::split("km"), Some((SiPrefix::Kilo, "m")));
        assert_eq!(SiPrefix::split("dam"), Some((SiPrefix::Deca, "m")));
        assert_eq!(SiPrefix::split("µs"), Some((SiPrefix::Micro, "s")));
        assert_eq!(SiPrefix::split("us"), Some((SiPrefix::Micro, "s")));
        assert_eq!(SiPrefix::split("m"), None);
        assert_eq!(SiPrefix::split("x"), None);
    }

    #[test]
    fn prefix_factors_are_exact() {
        assert_eq!(SiPrefix::Kilo.factor(), BigDecimal::from(1000));
        assert_eq!(SiPrefix::Milli.factor() * BigDecimal::from(1000), BigDecimal::from(1));
    }

    #[test]
    fn name_classification() {
        let plain = Expr::name(&Ident::new("x", Span::new(0, 1)));
        assert_eq!(plain.kind, ExprKind::Variable(Name::new("x")));

        let prefixed = Expr::name(&Ident::new("ms", Span::new(0, 2)));
        assert_eq!(
            prefixed.kind,
            ExprKind::MaybeUnitPrefix {
                name: Name::new("s"),
                full_name: Name::new("ms"),
                prefix: SiPrefix::Milli,
            }
        );
        assert_eq!(prefixed.as_name(), Some(&Name::new("ms")));
    }
}
