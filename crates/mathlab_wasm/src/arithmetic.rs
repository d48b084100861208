//! Fraction, number theory and decimal exports.

use crate::{js_error, to_js};
use anyhow::{bail, Context};
use mathlab_core::decimal::DecimalExpansion;
use mathlab_core::number_theory::{checked_lcm, factor_map, verbose_gcd};
use mathlab_core::{
    decimal_to_fraction, fraction_to_decimal, prime_factors, reduce_fraction, Rational,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Largest integer a JS number represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

const DEFAULT_MAX_DIGITS: u32 = 64;

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct FractionPayload {
    numerator: i64,
    denominator: i64,
    text: String,
    value: f64,
}

impl From<Rational> for FractionPayload {
    fn from(fraction: Rational) -> Self {
        Self {
            numerator: fraction.numerator(),
            denominator: fraction.denominator(),
            text: fraction.to_string(),
            value: fraction.to_f64(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GcdPayload {
    gcd: f64,
    steps: Vec<String>,
}

#[derive(Debug, Serialize)]
struct FactorEntry {
    prime: f64,
    exponent: u32,
}

#[derive(Debug, Serialize)]
struct FactorMapPayload {
    factors: Vec<FactorEntry>,
    text: String,
}

#[derive(Debug, Serialize)]
struct DerivationPayload {
    fraction: FractionPayload,
    steps: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ExpansionPayload {
    text: String,
    terminating: bool,
    expansion: DecimalExpansion,
}

/// Converts a JS number into an exact integer, rejecting fractions and
/// values beyond the safe integer range.
pub(crate) fn js_integer(value: f64, name: &str) -> anyhow::Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        bail!("{} must be an integer, got {}", name, value);
    }
    if value.abs() > MAX_SAFE_INTEGER {
        bail!("{} is outside the safe integer range", name);
    }
    Ok(value as i64)
}

pub(crate) fn js_natural(value: f64, name: &str) -> anyhow::Result<u64> {
    let n = js_integer(value, name)?;
    u64::try_from(n).with_context(|| format!("{} must not be negative", name))
}

pub(crate) fn reduce(numerator: f64, denominator: f64) -> anyhow::Result<FractionPayload> {
    let n = js_integer(numerator, "numerator")?;
    let d = js_integer(denominator, "denominator")?;
    let fraction = reduce_fraction(n, d).with_context(|| format!("Cannot reduce {}/{}", n, d))?;
    Ok(fraction.into())
}

/// The lcm as a JS number; results past `MAX_SAFE_INTEGER` would lose digits.
fn lcm_value(a: f64, b: f64) -> anyhow::Result<f64> {
    let a = js_integer(a, "a")?;
    let b = js_integer(b, "b")?;
    let lcm = checked_lcm(a, b).with_context(|| format!("lcm({}, {}) failed", a, b))?;
    if lcm as f64 > MAX_SAFE_INTEGER {
        bail!("lcm({}, {}) = {} is outside the safe integer range", a, b, lcm);
    }
    Ok(lcm as f64)
}

fn factor_payload(n: u64) -> FactorMapPayload {
    let map = factor_map(n);
    FactorMapPayload {
        factors: map
            .iter()
            .map(|(prime, exponent)| FactorEntry {
                prime: prime as f64,
                exponent,
            })
            .collect(),
        text: map.to_string(),
    }
}

fn derive_fraction(literal: &str) -> anyhow::Result<DerivationPayload> {
    let derivation = decimal_to_fraction(literal).context("Decimal conversion failed")?;
    Ok(DerivationPayload {
        fraction: derivation.fraction.into(),
        steps: derivation.steps,
    })
}

fn expand(numerator: f64, denominator: f64, max_digits: Option<u32>) -> anyhow::Result<ExpansionPayload> {
    let fraction = reduce(numerator, denominator)?;
    let value = Rational::new(fraction.numerator, fraction.denominator)?;
    let max_digits = max_digits.unwrap_or(DEFAULT_MAX_DIGITS) as usize;
    let expansion = fraction_to_decimal(value, max_digits)
        .with_context(|| format!("Cannot expand {}", fraction.text))?;
    Ok(ExpansionPayload {
        text: expansion.to_string(),
        terminating: expansion.is_terminating(),
        expansion,
    })
}

#[wasm_bindgen(js_name = reduceFraction)]
pub fn reduce_fraction_js(numerator: f64, denominator: f64) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    to_js(&reduce(numerator, denominator).map_err(js_error)?)
}

/// Returns `{ gcd, steps }` with the Euclidean division lines.
#[wasm_bindgen(js_name = gcd)]
pub fn gcd_js(a: f64, b: f64) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let a = js_integer(a, "a").map_err(js_error)?.unsigned_abs();
    let b = js_integer(b, "b").map_err(js_error)?.unsigned_abs();
    let (gcd, steps) = verbose_gcd(a, b);
    to_js(&GcdPayload {
        gcd: gcd as f64,
        steps,
    })
}

#[wasm_bindgen(js_name = lcm)]
pub fn lcm_js(a: f64, b: f64) -> Result<f64, JsValue> {
    console_error_panic_hook::set_once();
    lcm_value(a, b).map_err(js_error)
}

/// Prime factors in ascending order, with repetition.
#[wasm_bindgen(js_name = primeFactors)]
pub fn prime_factors_js(n: f64) -> Result<Vec<f64>, JsValue> {
    console_error_panic_hook::set_once();
    let n = js_natural(n, "n").map_err(js_error)?;
    Ok(prime_factors(n).map(|p| p as f64).collect())
}

#[wasm_bindgen(js_name = factorMap)]
pub fn factor_map_js(n: f64) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let n = js_natural(n, "n").map_err(js_error)?;
    to_js(&factor_payload(n))
}

#[wasm_bindgen(js_name = decimalToFraction)]
pub fn decimal_to_fraction_js(literal: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    to_js(&derive_fraction(literal).map_err(js_error)?)
}

#[wasm_bindgen(js_name = fractionToDecimal)]
pub fn fraction_to_decimal_js(
    numerator: f64,
    denominator: f64,
    max_digits: Option<u32>,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    to_js(&expand(numerator, denominator, max_digits).map_err(js_error)?)
}
