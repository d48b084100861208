//! Practice problems for every curriculum topic.
//!
//! Each kind carries its own payload, and consumers match on
//! [`PracticeProblem`] exhaustively.

use crate::decimal::{decimal_to_fraction, fraction_to_decimal, DecimalError};
use crate::elimination::{solve_augmented, EliminationSettings};
use crate::generator::{generate_practice_system, GeneratorError, GeneratorSettings, PracticeSystem};
use crate::number_theory::{
    checked_lcm, divisibility_rule, factor_map, verbose_gcd, FactorMap, NumberTheoryError,
};
use crate::rational::{Rational, RationalError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keeps trial division for factorization problems under 10^6 steps.
pub const MAX_NUMBER: u64 = 1_000_000_000_000;

const RULE_DIVISORS: [u64; 10] = [2, 3, 4, 5, 6, 8, 9, 10, 11, 25];
const FRACTION_DENOMINATORS: [i64; 13] = [2, 3, 4, 5, 6, 8, 9, 10, 11, 12, 15, 20, 25];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PracticeError {
    #[error("invalid practice settings: {0}")]
    InvalidSettings(&'static str),
    #[error(transparent)]
    Rational(#[from] RationalError),
    #[error(transparent)]
    NumberTheory(#[from] NumberTheoryError),
    #[error(transparent)]
    Decimal(#[from] DecimalError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error("the stored system has no unique solution")]
    Unsolvable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    Divisibility,
    Gcd,
    Lcm,
    PrimeFactorization,
    DecimalToFraction,
    LinearSystem,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; 6] = [
        ProblemKind::Divisibility,
        ProblemKind::Gcd,
        ProblemKind::Lcm,
        ProblemKind::PrimeFactorization,
        ProblemKind::DecimalToFraction,
        ProblemKind::LinearSystem,
    ];

    /// The serialized name, e.g. `prime_factorization`.
    pub fn name(self) -> &'static str {
        match self {
            ProblemKind::Divisibility => "divisibility",
            ProblemKind::Gcd => "gcd",
            ProblemKind::Lcm => "lcm",
            ProblemKind::PrimeFactorization => "prime_factorization",
            ProblemKind::DecimalToFraction => "decimal_to_fraction",
            ProblemKind::LinearSystem => "linear_system",
        }
    }

    pub fn from_name(name: &str) -> Option<ProblemKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeSettings {
    /// Upper bound for the integers used in number theory problems.
    pub max_number: u64,
    /// Digit budget when rendering a fraction as a repeating decimal.
    pub max_decimal_digits: usize,
    pub generator: GeneratorSettings,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            max_number: 1000,
            max_decimal_digits: 16,
            generator: GeneratorSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PracticeProblem {
    Divisibility { number: i64, divisor: u64 },
    Gcd { a: u64, b: u64 },
    Lcm { a: u64, b: u64 },
    PrimeFactorization { number: u64 },
    DecimalToFraction { literal: String },
    LinearSystem { system: PracticeSystem },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Divisible(bool),
    Integer(u64),
    Factors(FactorMap),
    Fraction(Rational),
    Solution([i64; 3]),
}

impl PracticeProblem {
    pub fn kind(&self) -> ProblemKind {
        match self {
            PracticeProblem::Divisibility { .. } => ProblemKind::Divisibility,
            PracticeProblem::Gcd { .. } => ProblemKind::Gcd,
            PracticeProblem::Lcm { .. } => ProblemKind::Lcm,
            PracticeProblem::PrimeFactorization { .. } => ProblemKind::PrimeFactorization,
            PracticeProblem::DecimalToFraction { .. } => ProblemKind::DecimalToFraction,
            PracticeProblem::LinearSystem { .. } => ProblemKind::LinearSystem,
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            PracticeProblem::Divisibility { number, divisor } => {
                format!("Is {number} divisible by {divisor}?")
            }
            PracticeProblem::Gcd { a, b } => format!("Find gcd({a}, {b})."),
            PracticeProblem::Lcm { a, b } => format!("Find lcm({a}, {b})."),
            PracticeProblem::PrimeFactorization { number } => {
                format!("Write the prime factorization of {number}.")
            }
            PracticeProblem::DecimalToFraction { literal } => {
                format!("Write {literal} as a fraction in lowest terms.")
            }
            PracticeProblem::LinearSystem { system } => {
                format!("Solve the system: {}.", system.equations().join("; "))
            }
        }
    }

    pub fn answer(&self) -> Result<Answer, PracticeError> {
        Ok(match self {
            PracticeProblem::Divisibility { number, divisor } => {
                Answer::Divisible(divisibility_rule(*number, *divisor)?.divisible)
            }
            PracticeProblem::Gcd { a, b } => Answer::Integer(verbose_gcd(*a, *b).0),
            PracticeProblem::Lcm { a, b } => Answer::Integer(checked_lcm(*a, *b)?),
            PracticeProblem::PrimeFactorization { number } => {
                Answer::Factors(factor_map(*number))
            }
            PracticeProblem::DecimalToFraction { literal } => {
                Answer::Fraction(decimal_to_fraction(literal)?.fraction)
            }
            PracticeProblem::LinearSystem { system } => Answer::Solution(system.solution),
        })
    }

    /// Worked solution shown after the learner answers.
    pub fn worked_solution(&self) -> Result<Vec<String>, PracticeError> {
        match self {
            PracticeProblem::Divisibility { number, divisor } => {
                Ok(vec![divisibility_rule(*number, *divisor)?.explanation])
            }
            PracticeProblem::Gcd { a, b } => Ok(verbose_gcd(*a, *b).1),
            PracticeProblem::Lcm { a, b } => {
                let (g, mut steps) = verbose_gcd(*a, *b);
                if g != 0 {
                    let l = checked_lcm(*a, *b)?;
                    steps.push(format!("lcm({a}, {b}) = {a} × {b} / {g} = {l}."));
                } else {
                    steps.push(format!("lcm({a}, {b}) = 0 because a factor is zero."));
                }
                Ok(steps)
            }
            PracticeProblem::PrimeFactorization { number } => {
                Ok(vec![format!("{number} = {}", factor_map(*number))])
            }
            PracticeProblem::DecimalToFraction { literal } => {
                Ok(decimal_to_fraction(literal)?.steps)
            }
            PracticeProblem::LinearSystem { system } => {
                let report =
                    solve_augmented(&system.to_rational_matrix(), &EliminationSettings::default());
                if !report.is_solved() {
                    return Err(PracticeError::Unsolvable);
                }
                Ok(report.steps.into_iter().map(|s| s.description).collect())
            }
        }
    }
}

/// Draws a fresh problem of the requested kind.
pub fn generate_problem<R: Rng + ?Sized>(
    kind: ProblemKind,
    rng: &mut R,
    settings: &PracticeSettings,
) -> Result<PracticeProblem, PracticeError> {
    if settings.max_number < 2 || settings.max_number > MAX_NUMBER {
        return Err(PracticeError::InvalidSettings(
            "max_number must lie between 2 and 10^12",
        ));
    }
    if settings.max_decimal_digits == 0 {
        return Err(PracticeError::InvalidSettings(
            "max_decimal_digits must be positive",
        ));
    }
    let max = settings.max_number;

    let problem = match kind {
        ProblemKind::Divisibility => {
            let divisor = RULE_DIVISORS[rng.gen_range(0..RULE_DIVISORS.len())];
            let number = if rng.gen_bool(0.5) && divisor <= max {
                divisor * rng.gen_range(1..=max / divisor)
            } else {
                rng.gen_range(1..=max)
            };
            PracticeProblem::Divisibility {
                number: number as i64,
                divisor,
            }
        }
        ProblemKind::Gcd => {
            let g = rng.gen_range(1..=12u64.min(max));
            let k = (max / g).max(1);
            PracticeProblem::Gcd {
                a: g * rng.gen_range(1..=k),
                b: g * rng.gen_range(1..=k),
            }
        }
        ProblemKind::Lcm => {
            let bound = max.min(50);
            PracticeProblem::Lcm {
                a: rng.gen_range(2..=bound),
                b: rng.gen_range(2..=bound),
            }
        }
        ProblemKind::PrimeFactorization => PracticeProblem::PrimeFactorization {
            number: rng.gen_range(2..=max),
        },
        ProblemKind::DecimalToFraction => {
            let denominator = FRACTION_DENOMINATORS[rng.gen_range(0..FRACTION_DENOMINATORS.len())];
            let numerator = rng.gen_range(1..denominator);
            let value = Rational::new(numerator, denominator)?;
            PracticeProblem::DecimalToFraction {
                literal: fraction_to_decimal(value, settings.max_decimal_digits)?.to_string(),
            }
        }
        ProblemKind::LinearSystem => PracticeProblem::LinearSystem {
            system: generate_practice_system(rng, &settings.generator)?,
        },
    };
    tracing::debug!(kind = ?problem.kind(), "generated practice problem");
    Ok(problem)
}
