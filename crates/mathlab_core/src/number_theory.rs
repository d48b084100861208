//! Integer primitives: GCD/LCM, prime factorization and divisibility checks.

use num_traits::PrimInt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::FusedIterator;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumberTheoryError {
    #[error("divisor must be nonzero")]
    ZeroDivisor,
    #[error("result does not fit in the integer type")]
    Overflow,
}

/// `|n|` widened to `u128`, so `MIN` of a signed type has a magnitude too.
fn magnitude<N: PrimInt>(n: N) -> u128 {
    n.to_i128()
        .map(i128::unsigned_abs)
        .or_else(|| n.to_u128())
        .unwrap_or(0)
}

fn euclid(mut u: u128, mut v: u128) -> u128 {
    while v != 0 {
        let t = v;
        v = u % v;
        u = t;
    }
    u
}

/// Greatest common divisor by the [Euclidean algorithm] on absolute values.
/// `gcd(0, 0) = 0`.
///
/// # Panics
///
/// When the result does not fit in `N`. For a signed type that only happens
/// for `gcd(MIN, 0)` and `gcd(MIN, MIN)`, whose gcd is `|MIN|`; use
/// [`checked_gcd`] to get an error instead.
///
/// [Euclidean algorithm]: https://en.wikipedia.org/wiki/Euclidean_algorithm
pub fn gcd<N: PrimInt>(a: N, b: N) -> N {
    match checked_gcd(a, b) {
        Ok(g) => g,
        Err(_) => panic!("gcd is not representable in the argument type"),
    }
}

pub fn checked_gcd<N: PrimInt>(a: N, b: N) -> Result<N, NumberTheoryError> {
    num_traits::cast::<u128, N>(euclid(magnitude(a), magnitude(b))).ok_or(NumberTheoryError::Overflow)
}

/// GCD together with the division lines of the Euclidean algorithm,
/// e.g. `48 = 2 × 18 + 12`.
pub fn verbose_gcd(a: u64, b: u64) -> (u64, Vec<String>) {
    let (mut u, mut v) = if a >= b { (a, b) } else { (b, a) };
    let mut steps = Vec::new();
    while v != 0 {
        steps.push(format!("{u} = {} × {v} + {}", u / v, u % v));
        let r = u % v;
        u = v;
        v = r;
    }
    steps.push(format!("The last nonzero remainder is {u}, so gcd({a}, {b}) = {u}."));
    (u, steps)
}

/// Least common multiple, `|a·b| / gcd(a, b)`.
///
/// Any zero argument gives 0, so `lcm(0, 0) = 0`.
///
/// # Panics
///
/// When the result does not fit in `N`; use [`checked_lcm`] when the inputs
/// are not known to be small.
pub fn lcm<N: PrimInt>(a: N, b: N) -> N {
    match checked_lcm(a, b) {
        Ok(l) => l,
        Err(_) => panic!("lcm overflows the argument type"),
    }
}

pub fn checked_lcm<N: PrimInt>(a: N, b: N) -> Result<N, NumberTheoryError> {
    if a.is_zero() || b.is_zero() {
        return Ok(N::zero());
    }
    let (u, v) = (magnitude(a), magnitude(b));
    (u / euclid(u, v))
        .checked_mul(v)
        .and_then(num_traits::cast::<u128, N>)
        .ok_or(NumberTheoryError::Overflow)
}

pub fn is_divisible_by<N: PrimInt>(n: N, d: N) -> Result<bool, NumberTheoryError> {
    if d.is_zero() {
        return Err(NumberTheoryError::ZeroDivisor);
    }
    Ok(magnitude(n) % magnitude(d) == 0)
}

pub fn is_prime(n: u64) -> bool {
    n >= 2 && prime_factors(n).next() == Some(n)
}

/// All positive divisors of `n` in increasing order. Empty for 0.
pub fn divisors(n: u64) -> Vec<u64> {
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1u64;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            small.push(d);
            if d != n / d {
                large.push(n / d);
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    small
}

/// Lazy trial-division factorization.
///
/// Yields prime factors in non-decreasing order, each repeated by its
/// multiplicity. Cloning the iterator restarts from the same point.
#[derive(Debug, Clone)]
pub struct PrimeFactors {
    remaining: u64,
    divisor: u64,
}

impl PrimeFactors {
    pub fn new(n: u64) -> Self {
        Self {
            remaining: n,
            divisor: 2,
        }
    }

    pub fn factor_map(self) -> FactorMap {
        self.collect()
    }
}

impl Iterator for PrimeFactors {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        while self.remaining > 1 {
            if self.divisor.saturating_mul(self.divisor) > self.remaining {
                let prime = self.remaining;
                self.remaining = 1;
                return Some(prime);
            }
            if self.remaining % self.divisor == 0 {
                self.remaining /= self.divisor;
                return Some(self.divisor);
            }
            self.divisor += 1;
        }
        None
    }
}

impl FusedIterator for PrimeFactors {}

/// Prime factors of `n` with repetition. 0 and 1 have none.
pub fn prime_factors(n: u64) -> PrimeFactors {
    PrimeFactors::new(n)
}

pub fn factor_map(n: u64) -> FactorMap {
    prime_factors(n).factor_map()
}

/// Prime → multiplicity, ordered by prime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorMap(BTreeMap<u64, u32>);

impl FactorMap {
    pub fn iter(&self) -> impl Iterator<Item = (u64, u32)> + '_ {
        self.0.iter().map(|(&p, &k)| (p, k))
    }

    pub fn multiplicity(&self, prime: u64) -> u32 {
        self.0.get(&prime).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reconstructs the factored number, `None` on overflow.
    pub fn product(&self) -> Option<u64> {
        self.iter()
            .try_fold(1u64, |acc, (p, k)| acc.checked_mul(p.checked_pow(k)?))
    }
}

impl FromIterator<u64> for FactorMap {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for p in iter {
            *map.entry(p).or_insert(0) += 1;
        }
        FactorMap(map)
    }
}

/// Renders `2^3 × 3 × 5`; an empty map renders as `1`.
impl fmt::Display for FactorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "1");
        }
        for (idx, (p, k)) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, " × ")?;
            }
            if k == 1 {
                write!(f, "{p}")?;
            } else {
                write!(f, "{p}^{k}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisibilityCheck {
    pub number: i64,
    pub divisor: u64,
    pub divisible: bool,
    pub explanation: String,
}

fn digit_sum(n: u64) -> u64 {
    n.to_string().bytes().map(|b| u64::from(b - b'0')).sum()
}

/// Checks `n` against `d` using the classroom shortcut rule when one exists,
/// falling back to plain division otherwise. The verdict always equals
/// `n mod d == 0`.
pub fn divisibility_rule(n: i64, d: u64) -> Result<DivisibilityCheck, NumberTheoryError> {
    if d == 0 {
        return Err(NumberTheoryError::ZeroDivisor);
    }
    let m = n.unsigned_abs();
    let divisible = m % d == 0;
    let verdict = if divisible { "is" } else { "is not" };

    let explanation = match d {
        2 => format!(
            "The last digit of {m} is {}, which {verdict} even.",
            m % 10
        ),
        5 => format!(
            "The last digit of {m} is {}; a multiple of 5 ends in 0 or 5, so {n} {verdict} divisible by 5.",
            m % 10
        ),
        10 => format!(
            "The last digit of {m} is {}; a multiple of 10 ends in 0, so {n} {verdict} divisible by 10.",
            m % 10
        ),
        3 | 9 => {
            let sum = digit_sum(m);
            format!(
                "The digit sum of {m} is {sum}, which {verdict} divisible by {d}.",
            )
        }
        4 | 25 => format!(
            "The last two digits of {m} form {}, which {verdict} divisible by {d}.",
            m % 100
        ),
        8 => format!(
            "The last three digits of {m} form {}, which {verdict} divisible by 8.",
            m % 1000
        ),
        6 => {
            let by_two = m % 2 == 0;
            let by_three = digit_sum(m) % 3 == 0;
            format!(
                "{n} {} divisible by 2 and {} divisible by 3; divisibility by 6 needs both.",
                if by_two { "is" } else { "is not" },
                if by_three { "is" } else { "is not" },
            )
        }
        11 => {
            let digits: Vec<i64> = m
                .to_string()
                .bytes()
                .rev()
                .map(|b| i64::from(b - b'0'))
                .collect();
            let alternating: i64 = digits
                .iter()
                .enumerate()
                .map(|(i, &dig)| if i % 2 == 0 { dig } else { -dig })
                .sum();
            format!(
                "The alternating digit sum of {m} is {alternating}, which {verdict} divisible by 11.",
            )
        }
        _ => format!(
            "{m} = {} × {d} + {}, so {n} {verdict} divisible by {d}.",
            m / d,
            m % d
        ),
    };

    Ok(DivisibilityCheck {
        number: n,
        divisor: d,
        divisible,
        explanation,
    })
}
