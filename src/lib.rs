//! gridtable - grid-cell model for embeddable diagram tables
//!
//! The table core of a diagram editor, compiled to WebAssembly and driven
//! by the surrounding canvas editor:
//! - Dense row-major cell grid with rectangular merge footprints
//! - Merge, unmerge, and structural row/column subdivision
//! - Dual encodings: the canonical versioned cell array plus the legacy
//!   parallel arrays old documents were saved with, kept in lockstep
//! - Percent-based track layout for the render layer
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { migrate_table } from 'gridtable';
//! await init();
//! const normalized = JSON.parse(migrate_table(JSON.stringify(element.table)));
//! ```

pub mod engine;
pub mod error;
pub mod grid;
pub mod layout;
pub mod resolver;
pub mod types;

use wasm_bindgen::prelude::*;

pub use engine::{SplitOutcome, TableEditor};
pub use types::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Load a table element from its JSON snapshot, migrate the legacy
/// encodings into the canonical form, and return the normalized JSON.
///
/// # Arguments
/// * `json` - The element's serialized table field
///
/// # Errors
/// Returns an error if the JSON is malformed or the migrated grid is
/// internally inconsistent.
#[wasm_bindgen]
pub fn migrate_table(json: &str) -> Result<String, JsValue> {
    let element =
        types::TableElement::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;

    element
        .to_json()
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Load and migrate a table element, returning it as a `JsValue`.
///
/// This is more efficient than [`migrate_table`] when the result will be
/// used directly in JavaScript.
///
/// # Errors
/// Returns an error if the JSON is malformed or the migrated grid is
/// internally inconsistent.
#[wasm_bindgen]
pub fn migrate_table_to_js(json: &str) -> Result<JsValue, JsValue> {
    let element =
        types::TableElement::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&element)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
