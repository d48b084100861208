//! Exact fractions in lowest terms.

use crate::number_theory::gcd;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RationalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("rational result does not fit in 64-bit integers")]
    Overflow,
    #[error("cannot parse fraction: {0}")]
    Parse(&'static str),
}

/// A rational number `numerator / denominator`.
///
/// Always normalized: `denominator > 0` and `gcd(|numerator|, denominator) = 1`,
/// so the derived equality is value equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRational", into = "RawRational")]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

#[derive(Serialize, Deserialize)]
struct RawRational {
    numerator: i64,
    denominator: i64,
}

impl TryFrom<RawRational> for Rational {
    type Error = RationalError;

    fn try_from(raw: RawRational) -> Result<Self, Self::Error> {
        Rational::new(raw.numerator, raw.denominator)
    }
}

impl From<Rational> for RawRational {
    fn from(value: Rational) -> Self {
        Self {
            numerator: value.numerator,
            denominator: value.denominator,
        }
    }
}

/// Reduces `numerator / denominator` to lowest terms with a positive denominator.
pub fn reduce_fraction(numerator: i64, denominator: i64) -> Result<Rational, RationalError> {
    Rational::new(numerator, denominator)
}

impl Rational {
    pub const ZERO: Rational = Rational {
        numerator: 0,
        denominator: 1,
    };
    pub const ONE: Rational = Rational {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: i64, denominator: i64) -> Result<Self, RationalError> {
        Self::from_wide(i128::from(numerator), i128::from(denominator))
    }

    pub fn from_integer(value: i64) -> Self {
        Self {
            numerator: value,
            denominator: 1,
        }
    }

    /// Normalizes a wide fraction and narrows it back to `i64`.
    fn from_wide(numerator: i128, denominator: i128) -> Result<Self, RationalError> {
        if denominator == 0 {
            return Err(RationalError::DivisionByZero);
        }
        let g = match gcd(numerator, denominator) {
            0 => 1,
            g => g,
        };
        let (mut num, mut den) = (numerator / g, denominator / g);
        if den < 0 {
            num = -num;
            den = -den;
        }
        Ok(Self {
            numerator: i64::try_from(num).map_err(|_| RationalError::Overflow)?,
            denominator: i64::try_from(den).map_err(|_| RationalError::Overflow)?,
        })
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    pub fn is_integer(&self) -> bool {
        self.denominator == 1
    }

    pub fn is_negative(&self) -> bool {
        self.numerator < 0
    }

    pub fn abs(&self) -> Result<Self, RationalError> {
        if self.is_negative() {
            self.checked_neg()
        } else {
            Ok(*self)
        }
    }

    pub fn checked_neg(&self) -> Result<Self, RationalError> {
        Self::from_wide(-i128::from(self.numerator), i128::from(self.denominator))
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, RationalError> {
        let (a, b) = self.wide();
        let (c, d) = other.wide();
        Self::from_wide(a * d + c * b, b * d)
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, RationalError> {
        let (a, b) = self.wide();
        let (c, d) = other.wide();
        Self::from_wide(a * d - c * b, b * d)
    }

    pub fn checked_mul(&self, other: &Self) -> Result<Self, RationalError> {
        let (a, b) = self.wide();
        let (c, d) = other.wide();
        Self::from_wide(a * c, b * d)
    }

    /// Fails with [`RationalError::DivisionByZero`] when `other` is zero.
    pub fn checked_div(&self, other: &Self) -> Result<Self, RationalError> {
        let (a, b) = self.wide();
        let (c, d) = other.wide();
        Self::from_wide(a * d, b * c)
    }

    pub fn recip(&self) -> Result<Self, RationalError> {
        Self::ONE.checked_div(self)
    }

    /// Compares `|self|` with `|other|` without risking overflow on negation.
    pub fn cmp_magnitude(&self, other: &Self) -> Ordering {
        let (a, b) = self.wide();
        let (c, d) = other.wide();
        (a.unsigned_abs() * d.unsigned_abs()).cmp(&(c.unsigned_abs() * b.unsigned_abs()))
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    fn wide(&self) -> (i128, i128) {
        (i128::from(self.numerator), i128::from(self.denominator))
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = self.wide();
        let (c, d) = other.wide();
        (a * d).cmp(&(c * b))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// Parses `"n"` or `"n/d"`, surrounding whitespace allowed.
impl FromStr for Rational {
    type Err = RationalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            Some((num, den)) => {
                let num = num
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| RationalError::Parse("invalid numerator"))?;
                let den = den
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| RationalError::Parse("invalid denominator"))?;
                Rational::new(num, den)
            }
            None => s
                .parse::<i64>()
                .map(Rational::from_integer)
                .map_err(|_| RationalError::Parse("invalid integer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d).expect("valid rational")
    }

    #[test]
    fn new_reduces_and_normalizes_sign() {
        let value = r(6, -8);
        assert_eq!(value.numerator(), -3);
        assert_eq!(value.denominator(), 4);

        let value = r(-6, -8);
        assert_eq!((value.numerator(), value.denominator()), (3, 4));
    }

    #[test]
    fn zero_numerator_normalizes_to_zero_over_one() {
        let value = r(0, -5);
        assert_eq!(value, Rational::ZERO);
        assert_eq!(value.denominator(), 1);
    }

    #[test]
    fn zero_denominator_is_rejected() {
        assert_eq!(reduce_fraction(3, 0), Err(RationalError::DivisionByZero));
        assert_eq!(reduce_fraction(0, 0), Err(RationalError::DivisionByZero));
    }

    #[test]
    fn arithmetic_stays_reduced() {
        let half = r(1, 2);
        let third = r(1, 3);
        assert_eq!(half.checked_add(&third).unwrap(), r(5, 6));
        assert_eq!(half.checked_sub(&third).unwrap(), r(1, 6));
        assert_eq!(half.checked_mul(&r(2, 3)).unwrap(), third);
        assert_eq!(half.checked_div(&r(3, 4)).unwrap(), r(2, 3));
    }

    #[test]
    fn divide_by_zero_rational_fails() {
        let err = r(1, 2).checked_div(&Rational::ZERO).expect_err("zero divisor");
        assert_eq!(err, RationalError::DivisionByZero);
        assert_eq!(Rational::ZERO.recip(), Err(RationalError::DivisionByZero));
    }

    #[test]
    fn overflow_is_reported() {
        let big = Rational::from_integer(i64::MAX);
        assert_eq!(big.checked_add(&Rational::ONE), Err(RationalError::Overflow));
        assert_eq!(
            Rational::from_integer(i64::MIN).checked_neg(),
            Err(RationalError::Overflow)
        );
    }

    #[test]
    fn display_omits_unit_denominator() {
        assert_eq!(r(4, 2).to_string(), "2");
        assert_eq!(r(-4, 6).to_string(), "-2/3");
    }

    #[test]
    fn ordering_is_by_value() {
        assert!(r(1, 3) < r(1, 2));
        assert!(r(-1, 2) < r(-1, 3));
        assert_eq!(r(2, 4).cmp(&r(1, 2)), Ordering::Equal);
    }

    #[test]
    fn parses_integer_and_fraction_text() {
        assert_eq!(" 6/-8 ".parse::<Rational>().unwrap(), r(-3, 4));
        assert_eq!("7".parse::<Rational>().unwrap(), Rational::from_integer(7));
        assert_eq!("1/0".parse::<Rational>(), Err(RationalError::DivisionByZero));
        assert!("a/b".parse::<Rational>().is_err());
    }
}
