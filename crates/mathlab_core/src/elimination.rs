//! Gaussian elimination with partial pivoting and a replayable step trace.
//!
//! The engine clones its input once and mutates only that working copy. Every
//! row operation appends an [`EliminationStep`] holding a deep snapshot of the
//! working matrix, so the trace is complete even when the solve fails.

use crate::rational::{Rational, RationalError};
use crate::traits::Cell;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Number of equations and unknowns handled by the public solve entry points.
pub const SYSTEM_SIZE: usize = 3;

/// Tolerances of the floating-point engine.
///
/// `pivot_tolerance` is the approximation boundary below which a pivot counts
/// as zero; it is also the threshold for snapping eliminated entries to zero.
/// `integer_snap_tolerance` only affects how solution values are presented.
/// Exact `Rational` cells ignore both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliminationSettings {
    pub pivot_tolerance: f64,
    pub integer_snap_tolerance: f64,
}

impl Default for EliminationSettings {
    fn default() -> Self {
        Self {
            pivot_tolerance: 1e-10,
            integer_snap_tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatrixShapeError {
    #[error("augmented matrix has no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected} (coefficients plus right-hand side)")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// An n × (n + 1) matrix: coefficients followed by the right-hand side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AugmentedMatrix<T> {
    rows: Vec<Vec<T>>,
}

impl<T: Cell> AugmentedMatrix<T> {
    pub fn new(rows: Vec<Vec<T>>) -> Result<Self, MatrixShapeError> {
        if rows.is_empty() {
            return Err(MatrixShapeError::Empty);
        }
        let expected = rows.len() + 1;
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(MatrixShapeError::Ragged {
                row,
                expected,
                found: cells.len(),
            });
        }
        Ok(Self { rows })
    }

    /// Number of equations (and unknowns).
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    /// Computes `b − A·x` exactly in the cell type.
    pub fn substitute(&self, solution: &[T]) -> Result<Vec<T>, RationalError> {
        let n = self.size();
        self.rows
            .iter()
            .map(|row| {
                (0..n).try_fold(row[n], |acc, j| acc.try_sub(row[j].try_mul(solution[j])?))
            })
            .collect()
    }

    /// Floating-point residuals `A·x − b`, for auditing a reported solution.
    pub fn residuals(&self, solution: &[T]) -> Vec<f64> {
        let n = self.size();
        let a = DMatrix::from_fn(n, n, |i, j| self.rows[i][j].to_f64());
        let b = DVector::from_fn(n, |i, _| self.rows[i][n].to_f64());
        let x = DVector::from_iterator(n, solution.iter().map(Cell::to_f64));
        (a * x - b).iter().copied().collect()
    }
}

impl<T: Cell> From<[[T; SYSTEM_SIZE + 1]; SYSTEM_SIZE]> for AugmentedMatrix<T> {
    fn from(rows: [[T; SYSTEM_SIZE + 1]; SYSTEM_SIZE]) -> Self {
        Self {
            rows: rows.iter().map(|row| row.to_vec()).collect(),
        }
    }
}

/// One entry of the audit trail. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EliminationStep<T> {
    pub description: String,
    pub matrix: AugmentedMatrix<T>,
    pub highlighted_rows: Option<Vec<usize>>,
    pub is_final: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EliminationPhase {
    Elimination,
    BackSubstitution,
}

impl fmt::Display for EliminationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EliminationPhase::Elimination => write!(f, "elimination"),
            EliminationPhase::BackSubstitution => write!(f, "back substitution"),
        }
    }
}

/// A zero pivot; `index` is the 0-based pivot column (elimination) or row
/// (back substitution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("zero pivot during {phase} (position {}): the system is not uniquely determined", .index + 1)]
pub struct SingularSystem {
    pub phase: EliminationPhase,
    pub index: usize,
}

impl SingularSystem {
    /// The remedy shown to learners, identical for both phases.
    pub fn user_message(&self) -> &'static str {
        "Re-check your system: it has no unique solution."
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EliminationError {
    #[error(transparent)]
    Singular(#[from] SingularSystem),
    #[error("exact arithmetic failed: {0}")]
    Arithmetic(#[from] RationalError),
}

/// Result of a solve: the full trace plus the solution or the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct EliminationReport<T> {
    pub steps: Vec<EliminationStep<T>>,
    pub solution: Result<Vec<T>, EliminationError>,
}

impl<T: Cell> EliminationReport<T> {
    pub fn is_solved(&self) -> bool {
        self.solution.is_ok()
    }

    pub fn values(&self) -> Option<&[T]> {
        self.solution.as_deref().ok()
    }

    /// The working matrix at the point the solve finished or failed.
    pub fn final_matrix(&self) -> Option<&AugmentedMatrix<T>> {
        self.steps.last().map(|step| &step.matrix)
    }
}

struct Trace<T> {
    steps: Vec<EliminationStep<T>>,
}

impl<T: Cell> Trace<T> {
    fn record(
        &mut self,
        description: String,
        matrix: &AugmentedMatrix<T>,
        highlighted_rows: Option<Vec<usize>>,
        is_final: bool,
    ) {
        tracing::trace!(step = self.steps.len(), %description, "elimination step");
        self.steps.push(EliminationStep {
            description,
            matrix: matrix.clone(),
            highlighted_rows,
            is_final,
        });
    }
}

/// Solves a 3-equation system given as a 3 × 4 augmented matrix of floats.
pub fn solve_linear_system(matrix: &[[f64; SYSTEM_SIZE + 1]; SYSTEM_SIZE]) -> EliminationReport<f64> {
    solve_linear_system_with(matrix, &EliminationSettings::default())
}

pub fn solve_linear_system_with(
    matrix: &[[f64; SYSTEM_SIZE + 1]; SYSTEM_SIZE],
    settings: &EliminationSettings,
) -> EliminationReport<f64> {
    solve_augmented(&AugmentedMatrix::from(*matrix), settings)
}

/// Exact counterpart of [`solve_linear_system`].
pub fn solve_rational_system(
    matrix: &[[Rational; SYSTEM_SIZE + 1]; SYSTEM_SIZE],
) -> EliminationReport<Rational> {
    solve_augmented(&AugmentedMatrix::from(*matrix), &EliminationSettings::default())
}

/// Forward elimination with partial pivoting followed by back substitution,
/// for any n × (n + 1) system. The input is never modified.
pub fn solve_augmented<T: Cell>(
    input: &AugmentedMatrix<T>,
    settings: &EliminationSettings,
) -> EliminationReport<T> {
    let mut trace = Trace { steps: Vec::new() };
    let solution = eliminate(input, settings, &mut trace);
    if let Err(err) = &solution {
        tracing::debug!(error = %err, steps = trace.steps.len(), "solve failed");
    }
    EliminationReport {
        steps: trace.steps,
        solution,
    }
}

fn eliminate<T: Cell>(
    input: &AugmentedMatrix<T>,
    settings: &EliminationSettings,
    trace: &mut Trace<T>,
) -> Result<Vec<T>, EliminationError> {
    let n = input.size();
    let tolerance = settings.pivot_tolerance;
    let mut work = input.clone();

    trace.record("Initial augmented matrix.".to_string(), &work, None, false);

    for c in 0..n {
        let pivot_row = (c + 1..n).fold(c, |best, r| {
            match work.rows[r][c].cmp_magnitude(&work.rows[best][c]) {
                Ordering::Greater => r,
                _ => best,
            }
        });
        tracing::debug!(column = c, pivot_row, "selected pivot");

        if pivot_row != c {
            work.rows.swap(pivot_row, c);
            trace.record(
                format!(
                    "Swap R{} and R{} to bring the largest entry of column {} into the pivot position.",
                    c + 1,
                    pivot_row + 1,
                    c + 1
                ),
                &work,
                Some(vec![c, pivot_row]),
                false,
            );
        }

        let pivot = work.rows[c][c];
        if pivot.is_negligible(tolerance) {
            return Err(SingularSystem {
                phase: EliminationPhase::Elimination,
                index: c,
            }
            .into());
        }

        for i in c + 1..n {
            let entry = work.rows[i][c];
            if entry.is_negligible(tolerance) {
                continue;
            }
            let factor = entry.try_div(pivot)?;
            for j in c + 1..=n {
                let scaled = factor.try_mul(work.rows[c][j])?;
                work.rows[i][j] = work.rows[i][j].try_sub(scaled)?.snap_zero(tolerance);
            }
            work.rows[i][c] = T::zero();
            trace.record(
                format!(
                    "R{} = R{} − ({}) × R{}",
                    i + 1,
                    i + 1,
                    T::describe_ratio(entry, pivot),
                    c + 1
                ),
                &work,
                Some(vec![i]),
                false,
            );
        }
    }

    trace.record(
        "Upper triangular form reached; solve by back substitution.".to_string(),
        &work,
        None,
        true,
    );

    let solution = back_substitute(&work, settings)?;
    Ok(solution
        .into_iter()
        .map(|v| v.snap_integer(settings.integer_snap_tolerance))
        .collect())
}

/// Solves an upper triangular system from the last row upward.
pub(crate) fn back_substitute<T: Cell>(
    triangular: &AugmentedMatrix<T>,
    settings: &EliminationSettings,
) -> Result<Vec<T>, EliminationError> {
    let n = triangular.size();
    let rows = triangular.rows();
    let mut solution = vec![T::zero(); n];
    for i in (0..n).rev() {
        let diagonal = rows[i][i];
        if diagonal.is_negligible(settings.pivot_tolerance) {
            return Err(SingularSystem {
                phase: EliminationPhase::BackSubstitution,
                index: i,
            }
            .into());
        }
        let mut acc = rows[i][n];
        for j in i + 1..n {
            acc = acc.try_sub(rows[i][j].try_mul(solution[j])?)?;
        }
        solution[i] = acc.try_div(diagonal)?;
    }
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXTBOOK: [[f64; 4]; 3] = [
        [1.0, 1.0, 1.0, 6.0],
        [2.0, 3.0, 1.0, 14.0],
        [1.0, 2.0, 3.0, 16.0],
    ];

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d).expect("valid rational")
    }

    fn rational_matrix(rows: [[i64; 4]; 3]) -> [[Rational; 4]; 3] {
        rows.map(|row| row.map(Rational::from_integer))
    }

    #[test]
    fn solves_textbook_system() {
        let report = solve_linear_system(&TEXTBOOK);
        let values = report.values().expect("unique solution");
        assert!((values[0] + 4.0 / 3.0).abs() < 1e-12);
        assert!((values[1] - 14.0 / 3.0).abs() < 1e-12);
        assert!((values[2] - 8.0 / 3.0).abs() < 1e-12);

        let residuals = AugmentedMatrix::from(TEXTBOOK).residuals(values);
        assert!(residuals.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn solves_textbook_system_exactly() {
        let matrix = rational_matrix([[1, 1, 1, 6], [2, 3, 1, 14], [1, 2, 3, 16]]);
        let report = solve_rational_system(&matrix);
        let values = report.values().expect("unique solution");
        assert_eq!(values, &[r(-4, 3), r(14, 3), r(8, 3)]);

        let back = AugmentedMatrix::from(matrix)
            .substitute(values)
            .expect("no overflow");
        assert!(back.iter().all(Rational::is_zero));
    }

    #[test]
    fn trace_records_pivoting_and_elimination() {
        let report = solve_linear_system(&TEXTBOOK);
        let descriptions: Vec<&str> = report.steps.iter().map(|s| s.description.as_str()).collect();

        assert_eq!(report.steps.len(), 6);
        assert_eq!(report.steps[0].matrix, AugmentedMatrix::from(TEXTBOOK));
        assert!(report.steps[0].highlighted_rows.is_none());
        assert!(descriptions[1].starts_with("Swap R1 and R2"));
        assert_eq!(report.steps[1].highlighted_rows, Some(vec![0, 1]));
        assert_eq!(descriptions[2], "R2 = R2 − (1/2) × R1");
        assert_eq!(report.steps[2].highlighted_rows, Some(vec![1]));
        assert_eq!(descriptions[3], "R3 = R3 − (1/2) × R1");
        assert_eq!(descriptions[4], "R3 = R3 − (-1) × R2");
        assert!(report.steps[5].is_final);
        assert!(report.steps[..5].iter().all(|s| !s.is_final));

        let triangular = report.final_matrix().expect("steps");
        assert_eq!(triangular.rows()[1][0], 0.0);
        assert_eq!(triangular.rows()[2][0], 0.0);
        assert_eq!(triangular.rows()[2][1], 0.0);
    }

    #[test]
    fn non_integer_factors_render_as_decimals() {
        let matrix = [[2.0, 1.0, 0.0, 3.0], [0.3, 1.0, 0.0, 1.3], [0.0, 0.0, 1.0, 1.0]];
        let report = solve_linear_system(&matrix);
        assert!(report
            .steps
            .iter()
            .any(|s| s.description == "R2 = R2 − (0.15) × R1"));
        let values = report.values().expect("unique solution");
        assert_eq!(values, &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn tiny_factors_are_not_shown_as_zero() {
        let matrix = [[1.0, 0.0, 0.0, 1.0], [1e-7, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]];
        let report = solve_linear_system(&matrix);
        assert_eq!(report.steps[1].description, "R2 = R2 − (1e-7) × R1");
        assert!(report.is_solved());
    }

    #[test]
    fn zero_column_is_singular_during_elimination() {
        let matrix = [[0.0, 1.0, 1.0, 2.0], [0.0, 2.0, 1.0, 3.0], [0.0, 1.0, 3.0, 4.0]];
        let report = solve_linear_system(&matrix);
        assert_eq!(
            report.solution,
            Err(EliminationError::Singular(SingularSystem {
                phase: EliminationPhase::Elimination,
                index: 0,
            }))
        );
        assert!(!report.steps.is_empty());
        assert!(report.steps.iter().all(|s| !s.is_final));
    }

    #[test]
    fn dependent_rows_keep_progress_until_failure() {
        let matrix = [[1.0, 2.0, 3.0, 6.0], [2.0, 4.0, 5.0, 11.0], [3.0, 6.0, 9.0, 18.0]];
        let report = solve_linear_system(&matrix);
        match report.solution {
            Err(EliminationError::Singular(err)) => {
                assert_eq!(err.phase, EliminationPhase::Elimination);
                assert_eq!(err.index, 1);
                assert!(err.to_string().contains("not uniquely determined"));
                assert_eq!(err.user_message(), "Re-check your system: it has no unique solution.");
            }
            other => panic!("expected singular system, got {other:?}"),
        }
        assert_eq!(report.steps.len(), 4);
    }

    #[test]
    fn back_substitution_reports_its_own_phase() {
        let triangular = AugmentedMatrix::new(vec![
            vec![1.0, 2.0, 3.0],
            vec![0.0, 0.0, 4.0],
        ])
        .expect("shape");
        let err = back_substitute(&triangular, &EliminationSettings::default())
            .expect_err("zero diagonal");
        assert_eq!(
            err,
            EliminationError::Singular(SingularSystem {
                phase: EliminationPhase::BackSubstitution,
                index: 1,
            })
        );
        assert!(err.to_string().contains("back substitution"));
    }

    #[test]
    fn resolving_the_first_snapshot_is_deterministic() {
        let first = solve_linear_system(&TEXTBOOK);
        let replay = solve_augmented(&first.steps[0].matrix, &EliminationSettings::default());
        assert_eq!(first, replay);
    }

    #[test]
    fn input_matrix_is_left_untouched() {
        let input = AugmentedMatrix::from(TEXTBOOK);
        let before = input.clone();
        let _ = solve_augmented(&input, &EliminationSettings::default());
        assert_eq!(input, before);
    }

    #[test]
    fn solutions_near_integers_are_snapped() {
        let matrix = [[3.0, 0.0, 0.0, 0.3 * 10.0], [0.0, 0.1, 0.0, 0.3], [0.0, 0.0, 1.0, -2.0]];
        let report = solve_linear_system(&matrix);
        assert_eq!(report.values().expect("solution"), &[1.0, 3.0, -2.0]);
    }

    #[test]
    fn generalizes_beyond_three_unknowns() {
        let matrix = AugmentedMatrix::new(vec![
            vec![2.0, 0.0, 0.0, 1.0, 5.0],
            vec![0.0, 1.0, 0.0, 0.0, 2.0],
            vec![1.0, 0.0, 1.0, 0.0, 4.0],
            vec![0.0, 0.0, 0.0, 1.0, 1.0],
        ])
        .expect("shape");
        let report = solve_augmented(&matrix, &EliminationSettings::default());
        assert_eq!(report.values().expect("solution"), &[2.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(
            AugmentedMatrix::<f64>::new(Vec::new()),
            Err(MatrixShapeError::Empty)
        );
        assert_eq!(
            AugmentedMatrix::new(vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]]),
            Err(MatrixShapeError::Ragged {
                row: 1,
                expected: 3,
                found: 2,
            })
        );
    }

    #[test]
    fn rational_overflow_is_reported_not_panicked() {
        let big = Rational::from_integer(i64::MAX);
        let matrix = [
            [Rational::ONE, big, Rational::ZERO, Rational::ONE],
            [big, Rational::ONE, Rational::ZERO, big],
            [Rational::ZERO, Rational::ZERO, Rational::ONE, Rational::ONE],
        ];
        let report = solve_rational_system(&matrix);
        assert_eq!(
            report.solution,
            Err(EliminationError::Arithmetic(RationalError::Overflow))
        );
        assert!(!report.steps.is_empty());
    }
}
