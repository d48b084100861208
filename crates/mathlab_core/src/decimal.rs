//! Conversion between decimal literals and exact fractions.
//!
//! Accepted literal shapes, each with an optional sign:
//! - terminating: `0.75`, `-1.25`, `3`
//! - purely repeating: `0.(3)`, `0.333...`, `2.(3)`
//! - mixed repeating: `0.1(6)`, `0.1666...`
//!
//! With the ellipsis marker the repeating block is the shortest period that
//! occurs at least twice at the end of the written digits, starting as early
//! as possible. Literals whose repetition cannot be identified are rejected
//! rather than guessed.

use crate::number_theory::gcd;
use crate::rational::Rational;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("malformed decimal \"{literal}\": {reason}")]
    Malformed { literal: String, reason: String },
    #[error("decimal \"{literal}\" has too many digits for exact 64-bit arithmetic")]
    Overflow { literal: String },
    #[error("decimal expansion exceeds {max_digits} digits")]
    ExpansionTooLong { max_digits: usize },
}

/// The exact value of a literal plus the commentary that derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalDerivation {
    pub fraction: Rational,
    pub steps: Vec<String>,
}

/// Digits of a parsed literal. All strings are ASCII digits only.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DecimalLiteral {
    negative: bool,
    integer: String,
    fixed: String,
    repeating: String,
}

impl DecimalLiteral {
    fn canonical(&self) -> String {
        let mut text = self.integer.clone();
        if !self.fixed.is_empty() || !self.repeating.is_empty() {
            text.push('.');
            text.push_str(&self.fixed);
        }
        if !self.repeating.is_empty() {
            text.push('(');
            text.push_str(&self.repeating);
            text.push(')');
        }
        text
    }
}

/// Longest digit run searched for a repeating block; the search is cubic in
/// the run length.
const MAX_ELLIPSIS_DIGITS: usize = 64;

fn malformed(literal: &str, reason: &str) -> DecimalError {
    DecimalError::Malformed {
        literal: literal.to_string(),
        reason: reason.to_string(),
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_literal(literal: &str) -> Result<DecimalLiteral, DecimalError> {
    let text = literal.trim();
    if text.is_empty() {
        return Err(malformed(literal, "empty literal"));
    }

    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (ellipsis, text) = if let Some(rest) = text.strip_suffix("...") {
        (true, rest)
    } else if let Some(rest) = text.strip_suffix('…') {
        (true, rest)
    } else {
        (false, text)
    };

    let Some((integer, fraction)) = text.split_once('.') else {
        if ellipsis || text.contains('(') || text.contains(')') {
            return Err(malformed(literal, "a repeating decimal needs a decimal point"));
        }
        if text.is_empty() || !all_digits(text) {
            return Err(malformed(literal, "expected digits"));
        }
        return Ok(DecimalLiteral {
            negative,
            integer: text.to_string(),
            fixed: String::new(),
            repeating: String::new(),
        });
    };

    if !all_digits(integer) {
        return Err(malformed(literal, "integer part must contain only digits"));
    }
    let integer = if integer.is_empty() { "0" } else { integer };

    let (fixed, repeating) = if let Some(open) = fraction.find('(') {
        if ellipsis {
            return Err(malformed(literal, "use either parentheses or an ellipsis, not both"));
        }
        let Some(block) = fraction[open + 1..].strip_suffix(')') else {
            return Err(malformed(literal, "the repeating block must close the literal"));
        };
        let fixed = &fraction[..open];
        if block.is_empty() {
            return Err(malformed(literal, "the repeating block is empty"));
        }
        if !all_digits(fixed) || !all_digits(block) {
            return Err(malformed(literal, "fractional part must contain only digits"));
        }
        (fixed.to_string(), block.to_string())
    } else {
        if fraction.contains(')') {
            return Err(malformed(literal, "unbalanced parentheses"));
        }
        if fraction.is_empty() {
            return Err(malformed(literal, "no digits after the decimal point"));
        }
        if !all_digits(fraction) {
            return Err(malformed(literal, "fractional part must contain only digits"));
        }
        if ellipsis {
            if fraction.len() > MAX_ELLIPSIS_DIGITS {
                return Err(DecimalError::Overflow {
                    literal: literal.to_string(),
                });
            }
            let (start, period) = find_repetition(fraction.as_bytes())
                .ok_or_else(|| malformed(literal, "no repeating block is visible before the ellipsis"))?;
            (
                fraction[..start].to_string(),
                fraction[start..start + period].to_string(),
            )
        } else {
            (fraction.to_string(), String::new())
        }
    };

    Ok(DecimalLiteral {
        negative,
        integer: integer.to_string(),
        fixed,
        repeating,
    })
}

/// Smallest period whose block occurs at least twice at the tail, anchored at
/// the earliest start. Returns `(start, period)`.
fn find_repetition(digits: &[u8]) -> Option<(usize, usize)> {
    let len = digits.len();
    for period in 1..=len / 2 {
        for start in 0..=len - 2 * period {
            let periodic = (start + period..len).all(|i| digits[i] == digits[i - period]);
            if periodic {
                return Some((start, period));
            }
        }
    }
    None
}

fn digits_value(digits: &str, literal: &str) -> Result<i64, DecimalError> {
    digits.bytes().try_fold(0i64, |acc, b| {
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(b - b'0')))
            .ok_or_else(|| DecimalError::Overflow {
                literal: literal.to_string(),
            })
    })
}

fn power_of_ten(exp: usize, literal: &str) -> Result<i64, DecimalError> {
    u32::try_from(exp)
        .ok()
        .and_then(|e| 10i64.checked_pow(e))
        .ok_or_else(|| DecimalError::Overflow {
            literal: literal.to_string(),
        })
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "digit"
    } else {
        "digits"
    }
}

/// Converts a decimal literal into an exact fraction, recording each step.
pub fn decimal_to_fraction(literal: &str) -> Result<DecimalDerivation, DecimalError> {
    let parsed = parse_literal(literal)?;
    let overflow = || DecimalError::Overflow {
        literal: literal.to_string(),
    };
    let mut steps = vec![format!("Let x = {}.", parsed.canonical())];

    let (numerator, denominator) = if parsed.repeating.is_empty() {
        let k = parsed.fixed.len();
        let numerator = digits_value(&format!("{}{}", parsed.integer, parsed.fixed), literal)?;
        let denominator = power_of_ten(k, literal)?;
        if k == 0 {
            steps.push("x is a whole number, so no scaling is needed.".to_string());
        } else {
            steps.push(format!(
                "x has {k} {} after the decimal point, so multiply by 10^{k} = {denominator}: {denominator}x = {numerator}.",
                plural(k)
            ));
        }
        (numerator, denominator)
    } else {
        let p = parsed.fixed.len();
        let r = parsed.repeating.len();
        let head = format!("{}{}", parsed.integer, parsed.fixed);
        let shifted = digits_value(&format!("{head}{}", parsed.repeating), literal)?;
        let unshifted = digits_value(&head, literal)?;
        let block_nines = power_of_ten(r, literal)? - 1;
        let fixed_scale = power_of_ten(p, literal)?;
        let denominator = fixed_scale.checked_mul(block_nines).ok_or_else(overflow)?;
        let numerator = shifted - unshifted;
        let block = &parsed.repeating;

        if p == 0 {
            let scale = power_of_ten(r, literal)?;
            steps.push(format!(
                "The repeating block \"{block}\" has {r} {}, so multiply by 10^{r} = {scale}: {scale}x = {shifted}.({block}).",
                plural(r)
            ));
            steps.push(format!(
                "Subtract x = {unshifted}.({block}): {scale}x − x = {shifted} − {unshifted}, so {denominator}x = {numerator}."
            ));
        } else {
            let scale = power_of_ten(p + r, literal)?;
            steps.push(format!(
                "The non-repeating part \"{}\" has {p} {}, so multiply by 10^{p} = {fixed_scale}: {fixed_scale}x = {unshifted}.({block}).",
                parsed.fixed,
                plural(p)
            ));
            steps.push(format!(
                "Shift one more block of {r} {}: 10^{} = {scale}, so {scale}x = {shifted}.({block}).",
                plural(r),
                p + r
            ));
            steps.push(format!(
                "Subtract: {scale}x − {fixed_scale}x = {shifted} − {unshifted}, so {denominator}x = {numerator}."
            ));
        }
        (numerator, denominator)
    };

    steps.push(format!("x = {numerator}/{denominator}."));
    let g = gcd(numerator, denominator);
    let magnitude = Rational::new(numerator, denominator).map_err(|_| overflow())?;
    if g > 1 {
        steps.push(format!(
            "Divide numerator and denominator by gcd({numerator}, {denominator}) = {g}: x = {magnitude}."
        ));
    } else {
        steps.push(format!(
            "gcd({numerator}, {denominator}) = 1, so {numerator}/{denominator} is already in lowest terms."
        ));
    }

    let fraction = if parsed.negative && !magnitude.is_zero() {
        let signed = magnitude.checked_neg().map_err(|_| overflow())?;
        steps.push(format!("The literal is negative, so the result is {signed}."));
        signed
    } else {
        magnitude
    };

    Ok(DecimalDerivation { fraction, steps })
}

/// A decimal expansion split into its integer, fixed and repeating digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalExpansion {
    pub negative: bool,
    pub integer_part: u64,
    pub non_repeating: String,
    pub repeating: String,
}

impl DecimalExpansion {
    pub fn is_terminating(&self) -> bool {
        self.repeating.is_empty()
    }
}

/// Renders `-1.1(6)`, `0.75` or `3`.
impl fmt::Display for DecimalExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{}", self.integer_part)?;
        if self.non_repeating.is_empty() && self.repeating.is_empty() {
            return Ok(());
        }
        write!(f, ".{}", self.non_repeating)?;
        if !self.repeating.is_empty() {
            write!(f, "({})", self.repeating)?;
        }
        Ok(())
    }
}

/// Long division of `value`, detecting the repeating block by the first
/// remainder that recurs. Fails once more than `max_digits` fractional digits
/// would be needed.
pub fn fraction_to_decimal(
    value: Rational,
    max_digits: usize,
) -> Result<DecimalExpansion, DecimalError> {
    let numerator = u128::from(value.numerator().unsigned_abs());
    let denominator = u128::from(value.denominator().unsigned_abs());

    let integer_part = (numerator / denominator) as u64;
    let mut remainder = numerator % denominator;
    let mut digits = String::new();
    let mut seen: HashMap<u128, usize> = HashMap::new();

    while remainder != 0 {
        if let Some(&start) = seen.get(&remainder) {
            return Ok(DecimalExpansion {
                negative: value.is_negative(),
                integer_part,
                non_repeating: digits[..start].to_string(),
                repeating: digits[start..].to_string(),
            });
        }
        if digits.len() >= max_digits {
            return Err(DecimalError::ExpansionTooLong { max_digits });
        }
        seen.insert(remainder, digits.len());
        remainder *= 10;
        let digit = (remainder / denominator) as u8;
        digits.push(char::from(b'0' + digit));
        remainder %= denominator;
    }

    Ok(DecimalExpansion {
        negative: value.is_negative(),
        integer_part,
        non_repeating: digits,
        repeating: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fraction(literal: &str) -> Rational {
        decimal_to_fraction(literal)
            .unwrap_or_else(|e| panic!("{literal}: {e}"))
            .fraction
    }

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d).expect("valid rational")
    }

    fn assert_malformed(literal: &str) {
        match decimal_to_fraction(literal) {
            Err(DecimalError::Malformed { .. }) => {}
            other => panic!("expected malformed error for {literal:?}, got {other:?}"),
        }
    }

    #[test]
    fn terminating_decimals_reduce() {
        assert_eq!(fraction("0.75"), r(3, 4));
        assert_eq!(fraction("0.5"), r(1, 2));
        assert_eq!(fraction("-1.25"), r(-5, 4));
        assert_eq!(fraction("3"), r(3, 1));
        assert_eq!(fraction(".125"), r(1, 8));
    }

    #[test]
    fn purely_repeating_with_ellipsis_and_parentheses() {
        assert_eq!(fraction("0.333..."), r(1, 3));
        assert_eq!(fraction("0.(3)"), r(1, 3));
        assert_eq!(fraction("0.142857142857..."), r(1, 7));
        assert_eq!(fraction("2.(3)"), r(7, 3));
        assert_eq!(fraction("0.(9)"), r(1, 1));
        assert_eq!(fraction("0.(09)"), r(1, 11));
    }

    #[test]
    fn mixed_repeating() {
        assert_eq!(fraction("0.1666..."), r(1, 6));
        assert_eq!(fraction("0.1(6)"), r(1, 6));
        assert_eq!(fraction("2.1(6)"), r(13, 6));
        assert_eq!(fraction("-0.08(3)"), r(-1, 12));
        assert_eq!(fraction("0.4166…"), r(5, 12));
    }

    #[test]
    fn derivation_documents_each_substitution() {
        let derivation = decimal_to_fraction("0.1666...").expect("valid literal");
        assert_eq!(derivation.steps[0], "Let x = 0.1(6).");
        assert!(derivation.steps.iter().any(|s| s.contains("10x = 1.(6)")));
        assert!(derivation.steps.iter().any(|s| s.contains("100x = 16.(6)")));
        assert!(derivation.steps.iter().any(|s| s.contains("90x = 15")));
        assert_eq!(
            derivation.steps.last().map(String::as_str),
            Some("Divide numerator and denominator by gcd(15, 90) = 15: x = 1/6.")
        );
    }

    #[test]
    fn terminating_derivation_mentions_power_of_ten() {
        let derivation = decimal_to_fraction("0.75").expect("valid literal");
        assert_eq!(
            derivation.steps,
            vec![
                "Let x = 0.75.".to_string(),
                "x has 2 digits after the decimal point, so multiply by 10^2 = 100: 100x = 75."
                    .to_string(),
                "x = 75/100.".to_string(),
                "Divide numerator and denominator by gcd(75, 100) = 25: x = 3/4.".to_string(),
            ]
        );
    }

    #[test]
    fn negative_zero_stays_zero() {
        let derivation = decimal_to_fraction("-0.0").expect("valid literal");
        assert_eq!(derivation.fraction, Rational::ZERO);
    }

    #[test]
    fn malformed_literals_are_rejected() {
        assert_malformed("");
        assert_malformed("abc");
        assert_malformed("1.2.3");
        assert_malformed("0.");
        assert_malformed("12...");
        assert_malformed("0.12...");
        assert_malformed("0.1()");
        assert_malformed("0.1(6");
        assert_malformed("0.(6)7");
        assert_malformed("0.1(6)...");
        assert_malformed("0.1)6");
        assert_malformed("1e5");
    }

    #[test]
    fn oversized_literals_overflow() {
        let err = decimal_to_fraction("0.12345678901234567890123").expect_err("too long");
        assert!(matches!(err, DecimalError::Overflow { .. }));
    }

    #[test]
    fn long_ellipsis_runs_are_rejected_before_searching() {
        let literal = format!("0.{}1...", "0".repeat(1500));
        let err = decimal_to_fraction(&literal).expect_err("too many digits");
        assert!(matches!(err, DecimalError::Overflow { .. }));

        let sixth = decimal_to_fraction(&format!("0.1{}...", "6".repeat(40))).expect("within the cap");
        assert_eq!(sixth.fraction, r(1, 6));
    }

    #[test]
    fn fraction_to_decimal_finds_cycles() {
        let sixth = fraction_to_decimal(r(1, 6), 64).expect("expansion");
        assert_eq!(sixth.non_repeating, "1");
        assert_eq!(sixth.repeating, "6");
        assert_eq!(sixth.to_string(), "0.1(6)");

        assert_eq!(fraction_to_decimal(r(-5, 4), 64).unwrap().to_string(), "-1.25");
        assert_eq!(fraction_to_decimal(r(3, 1), 64).unwrap().to_string(), "3");
        assert_eq!(fraction_to_decimal(r(1, 7), 64).unwrap().to_string(), "0.(142857)");
    }

    #[test]
    fn fraction_to_decimal_respects_digit_cap() {
        let err = fraction_to_decimal(r(1, 97), 10).expect_err("period of 96 digits");
        assert_eq!(err, DecimalError::ExpansionTooLong { max_digits: 10 });
    }

    #[test]
    fn expansion_text_converts_back() {
        let value = r(-13, 6);
        let expansion = fraction_to_decimal(value, 64).expect("expansion");
        assert_eq!(fraction(&expansion.to_string()), value);
    }
}
