//! Syntax tree for natpl programs
//!
//! A program is a list of [`LineItem`]s, one per source line. Expressions carry
//! their [`Span`] so runtime errors can point back at the source.

mod expr;
mod item;
mod pretty;

pub use expr::*;
pub use item::*;

pub use crate::lexer::Span;

use std::rc::Rc;

/// A trait for syntax nodes that have a location in the source
pub trait Spanned {
    fn span(&self) -> Span;
}

/// The name of a unit, variable or function. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Rc<str>);

impl Name {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Rc::from(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Self(Rc::from(name))
    }
}

impl std::borrow::Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A name together with where it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: Name,
    pub span: Span,
}

impl Ident {
    #[must_use]
    pub fn new(name: impl Into<Name>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl Spanned for Ident {
    fn span(&self) -> Span {
        self.span
    }
}
