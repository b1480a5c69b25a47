//! Errors raised by the DOM layer.

use wasm_bindgen::{JsCast, JsValue};
use weaver_code_core::{DocumentError, HistoryError};

/// Failures talking to the browser DOM.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DomError {
    #[error("no global window")]
    NoWindow,

    #[error("no document on window")]
    NoDocument,

    #[error("no native selection object")]
    NoSelection,

    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// A DOM call threw.
    #[error("{operation} failed: {message}")]
    Js {
        operation: &'static str,
        message: String,
    },

    /// The reader's offset math disagrees with the text it produced.
    #[error("inconsistent {what}: expected {expected}, got {actual}")]
    Inconsistent {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl DomError {
    /// Wrap a thrown `JsValue`.
    pub fn js(operation: &'static str, err: JsValue) -> Self {
        let message = err
            .as_string()
            .or_else(|| {
                err.dyn_ref::<js_sys::Error>()
                    .map(|e| String::from(e.message()))
            })
            .unwrap_or_else(|| format!("{err:?}"));
        Self::Js { operation, message }
    }
}

/// Failures surfaced by the editor orchestrator.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    History(#[from] HistoryError),

    /// The editor was used after `destroy`.
    #[error("editor has been destroyed")]
    Destroyed,
}
