//! Practice generation exports.

use crate::arithmetic::js_natural;
use crate::{js_error, to_js};
use anyhow::Context;
use mathlab_core::{
    generate_practice_system, generate_problem, Answer, GeneratorSettings, PracticeProblem,
    PracticeSettings, ProblemKind,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

#[derive(Debug, Serialize)]
struct SystemPayload {
    matrix: [[i64; 4]; 3],
    solution: [i64; 3],
    equations: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ProblemPayload {
    kind: &'static str,
    prompt: String,
    problem: PracticeProblem,
    answer: Answer,
    worked_solution: Vec<String>,
}

/// Seeded when `seed` is given so a page can replay an exercise; otherwise
/// drawn from the browser's entropy source.
fn practice_rng(seed: Option<f64>) -> anyhow::Result<ChaCha8Rng> {
    match seed {
        Some(seed) => Ok(ChaCha8Rng::seed_from_u64(js_natural(seed, "seed")?)),
        None => Ok(ChaCha8Rng::from_entropy()),
    }
}

fn decode_settings<T: DeserializeOwned + Default>(value: JsValue, what: &str) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {} settings: {}", what, e)))
}

fn system_payload(rng: &mut ChaCha8Rng, settings: &GeneratorSettings) -> anyhow::Result<SystemPayload> {
    let system =
        generate_practice_system(rng, settings).context("Practice system generation failed")?;
    Ok(SystemPayload {
        equations: system.equations(),
        matrix: system.matrix,
        solution: system.solution,
    })
}

fn problem_payload(
    kind: &str,
    rng: &mut ChaCha8Rng,
    settings: &PracticeSettings,
) -> anyhow::Result<ProblemPayload> {
    let kind = ProblemKind::from_name(kind).with_context(|| {
        let known: Vec<&str> = ProblemKind::ALL.iter().map(|k| k.name()).collect();
        format!("Unknown problem kind '{}' (expected one of {})", kind, known.join(", "))
    })?;
    let problem = generate_problem(kind, rng, settings)?;
    let answer = problem.answer()?;
    let worked_solution = problem
        .worked_solution()
        .context("Worked solution failed")?;
    Ok(ProblemPayload {
        kind: kind.name(),
        prompt: problem.prompt(),
        problem,
        answer,
        worked_solution,
    })
}

/// Returns `{ matrix, solution, equations }` for a random nonsingular system.
#[wasm_bindgen(js_name = generatePracticeSystem)]
pub fn generate_practice_system_js(seed: Option<f64>, settings: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let settings: GeneratorSettings = decode_settings(settings, "generator")?;
    let mut rng = practice_rng(seed).map_err(js_error)?;
    to_js(&system_payload(&mut rng, &settings).map_err(js_error)?)
}

/// `kind` is a snake_case problem kind such as `"prime_factorization"`.
#[wasm_bindgen(js_name = generatePracticeProblem)]
pub fn generate_practice_problem_js(
    kind: &str,
    seed: Option<f64>,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let settings: PracticeSettings = decode_settings(settings, "practice")?;
    let mut rng = practice_rng(seed).map_err(js_error)?;
    to_js(&problem_payload(kind, &mut rng, &settings).map_err(js_error)?)
}
