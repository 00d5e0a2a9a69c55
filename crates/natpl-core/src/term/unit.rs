//! Units as products of declared base units

use std::collections::BTreeMap;
use std::fmt;

use crate::ast::Name;

/// A product of base units with non-zero integer exponents.
///
/// Exponents are kept in a sorted map with zero entries removed, so two units
/// are equal exactly when they describe the same dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unit {
    factors: BTreeMap<Name, i64>,
}

impl Unit {
    /// The dimensionless unit
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single base unit
    #[must_use]
    pub fn new_named(name: Name) -> Self {
        let mut factors = BTreeMap::new();
        factors.insert(name, 1);
        Self { factors }
    }

    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.factors.is_empty()
    }

    /// Exponent of a base unit (0 if absent)
    #[must_use]
    pub fn exponent(&self, name: &str) -> i64 {
        self.factors.get(name).copied().unwrap_or(0)
    }

    /// `self * other`, or `None` if an exponent leaves the `i64` range
    #[must_use]
    pub fn multiply(&self, other: &Unit) -> Option<Unit> {
        self.combine(other, 1)
    }

    /// `self / other`, or `None` if an exponent leaves the `i64` range
    #[must_use]
    pub fn divide(&self, other: &Unit) -> Option<Unit> {
        self.combine(other, -1)
    }

    #[must_use]
    pub fn pow(&self, n: i64) -> Option<Unit> {
        let mut factors = BTreeMap::new();
        for (name, exp) in &self.factors {
            let exp = exp.checked_mul(n)?;
            if exp != 0 {
                factors.insert(name.clone(), exp);
            }
        }
        Some(Unit { factors })
    }

    fn combine(&self, other: &Unit, sign: i64) -> Option<Unit> {
        let mut factors = self.factors.clone();
        for (name, exp) in &other.factors {
            let entry = factors.entry(name.clone()).or_insert(0);
            *entry = entry.checked_add(exp.checked_mul(sign)?)?;
            if *entry == 0 {
                factors.remove(name);
            }
        }
        Some(Unit { factors })
    }
}

impl fmt::Display for Unit {
    /// Positive exponents first, then negative ones: `kg m s^-2`.
    /// The dimensionless unit is written `1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return f.write_str("1");
        }

        let positive = self.factors.iter().filter(|(_, &exp)| exp > 0);
        let negative = self.factors.iter().filter(|(_, &exp)| exp < 0);

        for (i, (name, exp)) in positive.chain(negative).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if *exp == 1 {
                write!(f, "{name}")?;
            } else {
                write!(f, "{name}^{exp}")?;
            }
        }
        Ok(())
    }
}
