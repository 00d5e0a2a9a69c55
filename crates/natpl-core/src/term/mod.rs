//! Values and units produced by the runtime

mod unit;
mod value;

pub use unit::Unit;
pub use value::{Value, ValueKind};

use bigdecimal::BigDecimal;

/// Longest plain rendering, in digits, a number may have
pub const MAX_DIGITS: u64 = 1_000_000;

/// Digits needed to write `n` out without exponent notation, ignoring
/// leading zeros of fractions
#[must_use]
pub fn digit_span(n: &BigDecimal) -> u64 {
    n.digits().saturating_add(n.fractional_digit_count().unsigned_abs())
}

/// Whether `n` stays within [`MAX_DIGITS`]
#[must_use]
pub fn within_digit_limit(n: &BigDecimal) -> bool {
    digit_span(n) <= MAX_DIGITS
}

/// Render a decimal without trailing zeros or exponent notation
#[must_use]
pub fn format_number(n: &BigDecimal) -> String {
    n.normalized().to_plain_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn plain_formatting() {
        let n = |s: &str| BigDecimal::from_str(s).unwrap();
        assert_eq!(format_number(&n("1.500")), "1.5");
        assert_eq!(format_number(&n("1e3")), "1000");
        assert_eq!(format_number(&n("0.00025")), "0.00025");
        assert_eq!(format_number(&n("-42")), "-42");
        assert_eq!(format_number(&n("0.000")), "0");
    }

    #[test]
    fn digit_limit_counts_scale() {
        let n = |s: &str| BigDecimal::from_str(s).unwrap();
        assert_eq!(digit_span(&n("12.5")), 4);
        assert_eq!(digit_span(&n("1e6")), 7);
        assert!(within_digit_limit(&n("1e999990")));
        assert!(within_digit_limit(&n("-1e-999990")));
        assert!(!within_digit_limit(&n("1e200000000")));
        assert!(!within_digit_limit(&n("1e-200000000")));
    }
}
