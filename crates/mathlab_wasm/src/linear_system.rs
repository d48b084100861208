//! Gaussian elimination exports.

use crate::{js_error, to_js};
use anyhow::{bail, Context};
use js_sys::Float64Array;
use mathlab_core::elimination::{EliminationError, EliminationPhase, SYSTEM_SIZE};
use mathlab_core::traits::{format_decimal, Cell};
use mathlab_core::{
    decimal_to_fraction, solve_augmented, AugmentedMatrix, EliminationReport, EliminationSettings,
    Rational,
};
use serde::Serialize;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

#[derive(Debug, Serialize)]
struct StepPayload {
    description: String,
    matrix: Vec<Vec<String>>,
    highlighted_rows: Option<Vec<usize>>,
    is_final: bool,
}

#[derive(Debug, Serialize)]
struct FailurePayload {
    message: String,
    user_message: String,
    phase: Option<EliminationPhase>,
    index: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ReportPayload {
    steps: Vec<StepPayload>,
    solved: bool,
    solution: Option<Vec<String>>,
    values: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    error: Option<FailurePayload>,
}

/// Splits a row-major buffer into the rows of a 3 × 4 augmented matrix.
fn system_rows<T: Clone>(values: &[T]) -> anyhow::Result<Vec<Vec<T>>> {
    let expected = SYSTEM_SIZE * (SYSTEM_SIZE + 1);
    if values.len() != expected {
        bail!(
            "Expected {} entries for a {} × {} augmented matrix, got {}",
            expected,
            SYSTEM_SIZE,
            SYSTEM_SIZE + 1,
            values.len()
        );
    }
    Ok(values.chunks(SYSTEM_SIZE + 1).map(<[T]>::to_vec).collect())
}

fn failure_payload(err: &EliminationError) -> FailurePayload {
    match err {
        EliminationError::Singular(singular) => FailurePayload {
            message: singular.to_string(),
            user_message: singular.user_message().to_string(),
            phase: Some(singular.phase),
            index: Some(singular.index),
        },
        EliminationError::Arithmetic(_) => FailurePayload {
            message: err.to_string(),
            user_message: "The exact values grew too large; try smaller coefficients.".to_string(),
            phase: None,
            index: None,
        },
    }
}

fn report_payload<T: Cell>(report: &EliminationReport<T>, render: impl Fn(T) -> String) -> ReportPayload {
    let steps = report
        .steps
        .iter()
        .map(|step| StepPayload {
            description: step.description.clone(),
            matrix: step
                .matrix
                .rows()
                .iter()
                .map(|row| row.iter().map(|&v| render(v)).collect())
                .collect(),
            highlighted_rows: step.highlighted_rows.clone(),
            is_final: step.is_final,
        })
        .collect();

    match &report.solution {
        Ok(solution) => ReportPayload {
            steps,
            solved: true,
            solution: Some(solution.iter().map(|&v| render(v)).collect()),
            values: Some(solution.iter().map(Cell::to_f64).collect()),
            residuals: report
                .steps
                .first()
                .map(|initial| initial.matrix.residuals(solution)),
            error: None,
        },
        Err(err) => ReportPayload {
            steps,
            solved: false,
            solution: None,
            values: None,
            residuals: None,
            error: Some(failure_payload(err)),
        },
    }
}

fn solve_float(values: &[f64], settings: &EliminationSettings) -> anyhow::Result<ReportPayload> {
    if values.iter().any(|v| !v.is_finite()) {
        bail!("Matrix entries must be finite numbers");
    }
    let matrix = AugmentedMatrix::new(system_rows(values)?)?;
    let report = solve_augmented(&matrix, settings);
    Ok(report_payload(&report, format_decimal))
}

/// Accepts `3`, `-1/2` or any decimal literal such as `0.1(6)`.
fn parse_exact_entry(text: &str) -> anyhow::Result<Rational> {
    if let Ok(value) = text.parse::<Rational>() {
        return Ok(value);
    }
    let derivation = decimal_to_fraction(text).with_context(|| format!("Invalid entry '{}'", text))?;
    Ok(derivation.fraction)
}

fn solve_exact(entries: &[String]) -> anyhow::Result<ReportPayload> {
    let rows = system_rows(entries)?
        .iter()
        .map(|row| row.iter().map(|entry| parse_exact_entry(entry)).collect())
        .collect::<anyhow::Result<Vec<Vec<Rational>>>>()?;
    let matrix = AugmentedMatrix::new(rows)?;
    let report = solve_augmented(&matrix, &EliminationSettings::default());
    Ok(report_payload(&report, |v: Rational| v.to_string()))
}

/// Solves a row-major 3 × 4 augmented matrix in floating point.
/// `settings` is an optional partial `EliminationSettings` object.
#[wasm_bindgen(js_name = solveLinearSystem)]
pub fn solve_linear_system_js(matrix: &Float64Array, settings: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let settings: EliminationSettings = if settings.is_undefined() || settings.is_null() {
        EliminationSettings::default()
    } else {
        from_value(settings)
            .map_err(|e| JsValue::from_str(&format!("Invalid elimination settings: {}", e)))?
    };
    to_js(&solve_float(&matrix.to_vec(), &settings).map_err(js_error)?)
}

/// Exact solve; entries are strings so fractions and repeating decimals
/// survive the trip from JS.
#[wasm_bindgen(js_name = solveExactSystem)]
pub fn solve_exact_system_js(entries: Vec<String>) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    to_js(&solve_exact(&entries).map_err(js_error)?)
}
