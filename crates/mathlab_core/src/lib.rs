//! The `mathlab_core` crate is the exact-computation engine behind the MathLab curriculum pages.
//! Every operation is a pure function: values in, values plus an explanatory trace out.
//!
//! Key components:
//! - **Rational**: exact fractions in lowest terms with checked arithmetic.
//! - **Number Theory**: GCD/LCM, lazy prime factorization, divisibility checks.
//! - **Decimal**: terminating and repeating decimal literals to exact fractions (and back).
//! - **Elimination**: Gaussian elimination with partial pivoting and a replayable step trace.
//! - **Generator**: random well-posed 3×3 integer systems for practice mode.
//! - **Practice**: generated exercises for every topic, with answers and worked solutions.
//! - **Traits**: `Cell`, the numeric abstraction the elimination engine runs over (`f64` or `Rational`).

pub mod decimal;
pub mod elimination;
pub mod generator;
pub mod number_theory;
pub mod practice;
pub mod rational;
pub mod traits;

#[cfg(test)]
mod proptests;

pub use decimal::{decimal_to_fraction, fraction_to_decimal, DecimalDerivation, DecimalError};
pub use elimination::{
    solve_augmented, solve_linear_system, solve_rational_system, AugmentedMatrix,
    EliminationReport, EliminationSettings, EliminationStep,
};
pub use generator::{generate_practice_system, GeneratorSettings, PracticeSystem};
pub use number_theory::{gcd, lcm, prime_factors, FactorMap};
pub use practice::{generate_problem, Answer, PracticeProblem, PracticeSettings, ProblemKind};
pub use rational::{reduce_fraction, Rational, RationalError};
