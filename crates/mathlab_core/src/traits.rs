use crate::rational::{Rational, RationalError};
use std::cmp::Ordering;
use std::fmt::Debug;

/// A trait for the entries of an augmented matrix.
/// Implemented for `f64` (approximate, tolerance-driven) and `Rational` (exact).
///
/// Arithmetic is fallible because exact rationals can overflow; the `f64`
/// implementation never fails.
pub trait Cell: Copy + PartialEq + Debug + Send + Sync + 'static {
    fn zero() -> Self;

    /// Compares absolute values, used for partial pivoting.
    fn cmp_magnitude(&self, other: &Self) -> Ordering;

    /// Whether the value counts as zero. Exact types ignore `tolerance`.
    fn is_negligible(&self, tolerance: f64) -> bool;

    fn try_sub(self, rhs: Self) -> Result<Self, RationalError>;
    fn try_mul(self, rhs: Self) -> Result<Self, RationalError>;
    fn try_div(self, rhs: Self) -> Result<Self, RationalError>;

    /// Replaces values within `tolerance` of zero by exactly zero.
    fn snap_zero(self, tolerance: f64) -> Self;

    /// Replaces values within `tolerance` of an integer by that integer.
    fn snap_integer(self, tolerance: f64) -> Self;

    /// Renders `numerator / denominator` for a step description: a reduced
    /// fraction when both operands are integers, a decimal otherwise.
    fn describe_ratio(numerator: Self, denominator: Self) -> String;

    fn to_f64(&self) -> f64;
}

impl Cell for f64 {
    fn zero() -> Self {
        0.0
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.abs()
            .partial_cmp(&other.abs())
            .unwrap_or(Ordering::Equal)
    }

    fn is_negligible(&self, tolerance: f64) -> bool {
        self.abs() < tolerance
    }

    fn try_sub(self, rhs: Self) -> Result<Self, RationalError> {
        Ok(self - rhs)
    }

    fn try_mul(self, rhs: Self) -> Result<Self, RationalError> {
        Ok(self * rhs)
    }

    fn try_div(self, rhs: Self) -> Result<Self, RationalError> {
        Ok(self / rhs)
    }

    fn snap_zero(self, tolerance: f64) -> Self {
        if self.abs() < tolerance {
            0.0
        } else {
            self
        }
    }

    fn snap_integer(self, tolerance: f64) -> Self {
        let rounded = self.round();
        if (self - rounded).abs() < tolerance {
            // Avoid rendering -0.
            rounded + 0.0
        } else {
            self
        }
    }

    fn describe_ratio(numerator: Self, denominator: Self) -> String {
        if let (Some(n), Some(d)) = (as_exact_integer(numerator), as_exact_integer(denominator)) {
            if let Ok(ratio) = Rational::new(n, d) {
                return ratio.to_string();
            }
        }
        format_decimal(numerator / denominator)
    }

    fn to_f64(&self) -> f64 {
        *self
    }
}

impl Cell for Rational {
    fn zero() -> Self {
        Rational::ZERO
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        Rational::cmp_magnitude(self, other)
    }

    fn is_negligible(&self, _tolerance: f64) -> bool {
        self.is_zero()
    }

    fn try_sub(self, rhs: Self) -> Result<Self, RationalError> {
        self.checked_sub(&rhs)
    }

    fn try_mul(self, rhs: Self) -> Result<Self, RationalError> {
        self.checked_mul(&rhs)
    }

    fn try_div(self, rhs: Self) -> Result<Self, RationalError> {
        self.checked_div(&rhs)
    }

    fn snap_zero(self, _tolerance: f64) -> Self {
        self
    }

    fn snap_integer(self, _tolerance: f64) -> Self {
        self
    }

    fn describe_ratio(numerator: Self, denominator: Self) -> String {
        match numerator.checked_div(&denominator) {
            Ok(ratio) => ratio.to_string(),
            Err(_) => format_decimal(numerator.to_f64() / denominator.to_f64()),
        }
    }

    fn to_f64(&self) -> f64 {
        Rational::to_f64(self)
    }
}

fn as_exact_integer(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(value as i64)
    } else {
        None
    }
}

/// Fixed six-place rendering with trailing zeros trimmed. Nonzero values
/// below 10^-6 in magnitude switch to scientific notation, e.g. `1.5e-7`.
pub fn format_decimal(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value != 0.0 && value.abs() < 1e-6 {
        let text = format!("{:.6e}", value);
        return match text.split_once('e') {
            Some((mantissa, exponent)) => {
                let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
                format!("{mantissa}e{exponent}")
            }
            None => text,
        };
    }
    let text = format!("{:.6}", value);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
