//! Display for syntax nodes, used when echoing `print` lines

use std::fmt::{self, Display, Formatter};

use crate::term::format_number;

use super::{Declaration, Expr, ExprKind, Ident, InfixOp, Item, LineItem, PrefixOp, SiPrefix};

fn write_comma_separated<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Display for SiPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Display for PrefixOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for InfixOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(n) => f.write_str(&format_number(n)),
            ExprKind::Variable(name) => write!(f, "{name}"),
            ExprKind::MaybeUnitPrefix { full_name, .. } => write!(f, "{full_name}"),
            ExprKind::Call { base, args } => {
                write!(f, "{base}(")?;
                write_comma_separated(f, args)?;
                write!(f, ")")
            }
            ExprKind::Prefix { op, expr } => write!(f, "{op}{expr}"),
            ExprKind::Infix { op: InfixOp::Pow, lhs, rhs } => write!(f, "{lhs}^{rhs}"),
            ExprKind::Infix { op, lhs, rhs } => write!(f, "{lhs} {op} {rhs}"),
            ExprKind::UnitOf(expr) => write!(f, "[{expr}]"),
            ExprKind::Parenthesised(expr) => write!(f, "({expr})"),
        }
    }
}

impl Display for Declaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(params) = &self.params {
            write!(f, "(")?;
            write_comma_separated(f, params)?;
            write!(f, ")")?;
        }
        write!(f, " = {}", self.rhs)
    }
}

impl Display for LineItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LineItem::Empty => Ok(()),
            LineItem::UnitDeclaration(_, name) => write!(f, "unit {name}"),
            LineItem::MaybeDeclarationOrEquality(decl) => write!(f, "{decl}"),
            LineItem::PrintedExpression(_, expr) => write!(f, "print {expr}"),
            LineItem::SilentExpression(expr) => write!(f, "{expr}"),
        }
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Item::UnitDeclaration(_, name) => write!(f, "unit {name}"),
            Item::VariableDeclaration { name, rhs, .. } => write!(f, "{name} = {rhs}"),
            Item::FunctionDeclaration {
                name, params, rhs, ..
            } => {
                write!(f, "{name}(")?;
                write_comma_separated(f, params)?;
                write!(f, ") = {rhs}")
            }
            Item::PrintedExpression(_, expr) => write!(f, "print {expr}"),
            Item::SilentExpression(expr) => write!(f, "{expr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;

    fn roundtrip(source: &str) -> String {
        Parser::parse_line(source).unwrap().to_string()
    }

    #[test]
    fn pretty_expressions() {
        assert_eq!(roundtrip("1+2*3"), "1 + 2 * 3");
        assert_eq!(roundtrip("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(roundtrip("-x^2"), "-x^2");
        assert_eq!(roundtrip("[ 3 km ]"), "[3 * km]");
        assert_eq!(roundtrip("f( 1 ,2 )"), "f(1, 2)");
    }

    #[test]
    fn pretty_lines() {
        assert_eq!(roundtrip("unit   m"), "unit m");
        assert_eq!(roundtrip("print 1.50"), "print 1.5");
        assert_eq!(roundtrip("area(w,h) = w*h"), "area(w, h) = w * h");
    }
}
