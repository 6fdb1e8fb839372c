//! Error types for WebAssembly bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in WebAssembly bridge implementations
#[derive(Error, Debug)]
pub enum WasmError {
    /// IndexedDB operation failed
    #[error("IndexedDB error: {0}")]
    IndexedDb(String),

    /// JavaScript error from web-sys
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// A browser API the bridge relies on is missing
    #[error("Browser API not available: {0}")]
    NotAvailable(String),

    /// The audio element refused an instruction
    #[error("Media error: {0}")]
    Media(String),
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::NotAvailable(api) => BridgeError::NotAvailable(api),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

impl From<JsValue> for WasmError {
    fn from(js_value: JsValue) -> Self {
        WasmError::JavaScript(describe_js_value(&js_value))
    }
}

/// Human-readable text for a thrown JavaScript value.
pub(crate) fn describe_js_value(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        text
    } else if let Some(exception) = value.dyn_ref::<web_sys::DomException>() {
        format!("{}: {}", exception.name(), exception.message())
    } else if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        error.message().into()
    } else {
        format!("{value:?}")
    }
}

/// Wrap a JavaScript failure as a bridge error tagged with `context`.
pub(crate) fn js_error(context: &str, err: JsValue) -> BridgeError {
    BridgeError::OperationFailed(format!("{context}: {}", describe_js_value(&err)))
}
