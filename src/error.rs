//! Structured error types for gridtable.
//!
//! Engine operations are defensive no-ops and never error; these types cover
//! the load/serialize boundary where malformed documents can appear.

/// All errors that can occur while loading or saving a table element.
#[derive(Debug, thiserror::Error)]
pub enum GridTableError {
    /// JSON (de)serialization error from serde.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Table dimensions are unusable (zero rows/columns, track count mismatch).
    #[error("Invalid dimensions: {0}")]
    Dimension(String),

    /// Span data that cannot be normalized into a tiling grid.
    #[error("Inconsistent span data: {0}")]
    Span(String),

    /// Catch-all for string errors during migration.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridTableError>;

impl From<String> for GridTableError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridTableError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridTableError> for wasm_bindgen::JsValue {
    fn from(e: GridTableError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
