//! Random well-posed 3×3 integer systems for practice mode.

use crate::elimination::{AugmentedMatrix, SYSTEM_SIZE};
use crate::rational::Rational;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bound on generated magnitudes; keeps every determinant and right-hand side
/// comfortably inside 64-bit arithmetic.
pub const MAX_MAGNITUDE: i64 = 1_000_000;

/// Upper bound on `GeneratorSettings::max_attempts`.
pub const MAX_ATTEMPTS: usize = 100_000;

const VARIABLES: [&str; SYSTEM_SIZE] = ["x", "y", "z"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("invalid {name} range [{min}, {max}]: {reason}")]
    InvalidRange {
        name: &'static str,
        min: i64,
        max: i64,
        reason: &'static str,
    },
    #[error("max_attempts must lie between 1 and 100000, got {attempts}")]
    InvalidAttempts { attempts: usize },
    #[error("no nonsingular coefficient matrix found in {attempts} attempts")]
    AttemptsExhausted { attempts: usize },
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    fn validate(&self, name: &'static str, needs_nonzero: bool) -> Result<(), GeneratorError> {
        let invalid = |reason| GeneratorError::InvalidRange {
            name,
            min: self.min,
            max: self.max,
            reason,
        };
        if self.min > self.max {
            return Err(invalid("min exceeds max"));
        }
        if self.min < -MAX_MAGNITUDE || self.max > MAX_MAGNITUDE {
            return Err(invalid("values must lie within ±1000000"));
        }
        if needs_nonzero && self.min == 0 && self.max == 0 {
            return Err(invalid("range contains no nonzero value"));
        }
        Ok(())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        rng.gen_range(self.min..=self.max)
    }

    /// Uniform over the nonzero values of the range.
    fn sample_nonzero<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        let spans_zero = self.min <= 0 && self.max >= 0;
        let count = self.max - self.min + 1 - i64::from(spans_zero);
        let value = self.min + rng.gen_range(0..count);
        if spans_zero && value >= 0 {
            value + 1
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub coefficient_range: IntRange,
    pub solution_range: IntRange,
    pub max_attempts: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            coefficient_range: IntRange::new(-9, 9),
            solution_range: IntRange::new(-9, 9),
            max_attempts: 1000,
        }
    }
}

/// A generated system together with the integer solution it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSystem {
    pub matrix: [[i64; SYSTEM_SIZE + 1]; SYSTEM_SIZE],
    pub solution: [i64; SYSTEM_SIZE],
}

impl PracticeSystem {
    pub fn coefficients(&self) -> [[i64; SYSTEM_SIZE]; SYSTEM_SIZE] {
        self.matrix.map(|row| [row[0], row[1], row[2]])
    }

    pub fn to_rational_matrix(&self) -> AugmentedMatrix<Rational> {
        AugmentedMatrix::from(self.matrix.map(|row| row.map(Rational::from_integer)))
    }

    /// Renders each row as `2x - y + z = 5`.
    pub fn equations(&self) -> Vec<String> {
        self.matrix
            .iter()
            .map(|row| format_equation(&row[..SYSTEM_SIZE], row[SYSTEM_SIZE], &VARIABLES))
            .collect()
    }
}

/// Determinant by cofactor expansion along the first row.
pub fn determinant(m: &[[i64; SYSTEM_SIZE]; SYSTEM_SIZE]) -> i128 {
    let e = |r: usize, c: usize| i128::from(m[r][c]);
    e(0, 0) * (e(1, 1) * e(2, 2) - e(1, 2) * e(2, 1))
        - e(0, 1) * (e(1, 0) * e(2, 2) - e(1, 2) * e(2, 0))
        + e(0, 2) * (e(1, 0) * e(2, 1) - e(1, 1) * e(2, 0))
}

/// Samples nonzero coefficients until the matrix is nonsingular, then builds the
/// right-hand side from a sampled integer solution, so the system has exactly
/// that solution.
pub fn generate_practice_system<R: Rng + ?Sized>(
    rng: &mut R,
    settings: &GeneratorSettings,
) -> Result<PracticeSystem, GeneratorError> {
    settings.coefficient_range.validate("coefficient", true)?;
    settings.solution_range.validate("solution", false)?;
    if settings.max_attempts == 0 || settings.max_attempts > MAX_ATTEMPTS {
        return Err(GeneratorError::InvalidAttempts {
            attempts: settings.max_attempts,
        });
    }

    let solution = [(); SYSTEM_SIZE].map(|_| settings.solution_range.sample(rng));

    for attempt in 0..settings.max_attempts {
        let coefficients = [[(); SYSTEM_SIZE]; SYSTEM_SIZE]
            .map(|row| row.map(|_| settings.coefficient_range.sample_nonzero(rng)));
        if determinant(&coefficients) == 0 {
            tracing::debug!(attempt, "rejected singular coefficient matrix");
            continue;
        }

        let matrix = coefficients.map(|row| {
            let rhs: i64 = row.iter().zip(solution.iter()).map(|(a, x)| a * x).sum();
            [row[0], row[1], row[2], rhs]
        });
        return Ok(PracticeSystem { matrix, solution });
    }

    tracing::warn!(
        attempts = settings.max_attempts,
        "practice system generation gave up"
    );
    Err(GeneratorError::AttemptsExhausted {
        attempts: settings.max_attempts,
    })
}

/// Renders `a·x + b·y + c·z = d` with unit coefficients and zero terms
/// omitted. An all-zero left-hand side renders as `0`.
pub fn format_equation(coefficients: &[i64], rhs: i64, variables: &[&str]) -> String {
    let mut lhs = String::new();
    for (&coeff, var) in coefficients.iter().zip(variables) {
        if coeff == 0 {
            continue;
        }
        let magnitude = coeff.unsigned_abs();
        let sign = match (lhs.is_empty(), coeff < 0) {
            (true, true) => "-",
            (true, false) => "",
            (false, true) => " - ",
            (false, false) => " + ",
        };
        lhs.push_str(sign);
        if magnitude != 1 {
            lhs.push_str(&magnitude.to_string());
        }
        lhs.push_str(var);
    }
    if lhs.is_empty() {
        lhs.push('0');
    }
    format!("{lhs} = {rhs}")
}
