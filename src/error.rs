//! Error types for the browser shell.
//!
//! Story actions themselves never fail (see [`crate::Outcome`]); these errors
//! only come from mounting into the page or reading configuration.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Result type for shell operations.
pub type StoryResult<T> = Result<T, StoryError>;

#[derive(Debug, Error)]
pub enum StoryError {
    /// No global `window` (not running in a browser).
    #[error("no window")]
    NoWindow,

    /// The window has no document.
    #[error("no document")]
    NoDocument,

    /// The document has no body to mount into.
    #[error("no document body")]
    NoBody,

    /// A DOM call threw.
    #[error("dom: {0}")]
    Dom(String),

    /// Story configuration could not be parsed.
    #[cfg(feature = "serde_json")]
    #[error("invalid story config: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<JsValue> for StoryError {
    fn from(value: JsValue) -> Self {
        StoryError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<StoryError> for JsValue {
    fn from(err: StoryError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
