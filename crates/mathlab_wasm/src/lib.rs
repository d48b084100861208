//! WASM bindings for the MathLab core.
//!
//! Every export installs the panic hook, decodes its JS arguments, calls into
//! `mathlab_core`, and hands back a serde-serialized payload. Errors cross the
//! boundary as plain strings.

pub mod arithmetic;
pub mod linear_system;
pub mod practice;

use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

/// Maps become plain objects so factor maps read naturally in JS.
pub(crate) fn to_js<T: Serialize>(payload: &T) -> Result<JsValue, JsValue> {
    payload
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

pub(crate) fn js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}
