//! Line-level items

use super::{Expr, ExprKind, Ident, InfixOp, Name, Span, Spanned};

/// One parsed source line, before the runtime has decided what `=` means
#[derive(Debug, Clone, PartialEq)]
pub enum LineItem {
    Empty,
    /// `unit NAME`
    UnitDeclaration(Span, Ident),
    /// `NAME = expr` or `NAME(a, b) = expr`. A declaration if the name is new,
    /// an equality test otherwise.
    MaybeDeclarationOrEquality(Declaration),
    /// `print expr`
    PrintedExpression(Span, Expr),
    SilentExpression(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub span: Span,
    pub name: Ident,
    /// `Some` for the function form, even with no parameters
    pub params: Option<Vec<Ident>>,
    pub rhs: Expr,
}

impl Declaration {
    #[must_use]
    pub fn declaration_name(&self) -> &Name {
        &self.name.name
    }

    #[must_use]
    pub fn into_declaration(self) -> Item {
        match self.params {
            Some(params) => Item::FunctionDeclaration {
                span: self.span,
                name: self.name,
                params,
                rhs: self.rhs,
            },
            None => Item::VariableDeclaration {
                span: self.span,
                name: self.name,
                rhs: self.rhs,
            },
        }
    }

    /// Read the line as `lhs = rhs` comparing two values
    #[must_use]
    pub fn into_expression(self) -> Item {
        let base = Expr::name(&self.name);
        let lhs = match self.params {
            Some(params) => {
                let end = params.last().map_or(self.name.span, |p| p.span);
                Expr::new(
                    ExprKind::Call {
                        base: Box::new(base),
                        args: params.iter().map(Expr::name).collect(),
                    },
                    self.name.span.merge(end),
                )
            }
            None => base,
        };
        Item::SilentExpression(Expr::infix(InfixOp::Eq, lhs, self.rhs))
    }
}

impl Spanned for Declaration {
    fn span(&self) -> Span {
        self.span
    }
}

/// A line item with its meaning resolved
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    UnitDeclaration(Span, Ident),
    VariableDeclaration {
        span: Span,
        name: Ident,
        rhs: Expr,
    },
    FunctionDeclaration {
        span: Span,
        name: Ident,
        params: Vec<Ident>,
        rhs: Expr,
    },
    PrintedExpression(Span, Expr),
    SilentExpression(Expr),
}

impl Spanned for Item {
    fn span(&self) -> Span {
        match self {
            Item::UnitDeclaration(span, _)
            | Item::VariableDeclaration { span, .. }
            | Item::FunctionDeclaration { span, .. }
            | Item::PrintedExpression(span, _) => *span,
            Item::SilentExpression(expr) => expr.span,
        }
    }
}
