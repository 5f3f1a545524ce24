//! Structured error types for datagrid.
//!
//! Lookups that simply find nothing (a value provider without a value, a hit
//! test outside the grid) are `Option`s, not errors.

/// All errors that can occur while configuring or driving a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// An axis size that is zero, negative or not finite.
    #[error("Invalid axis size {size} at index {index:?}")]
    InvalidSize { index: Option<u32>, size: f64 },

    /// Wraparound requested on an axis without a known count.
    #[error("Wraparound requires a finite count")]
    WraparoundWithoutCount,

    /// Forward scan over an unbounded variable-size axis gave up.
    #[error("Scan limit of {limit} indices exceeded")]
    ScanLimit { limit: u32 },

    /// An operation needed the total extent of an unbounded axis.
    #[error("Unbounded extent: {0}")]
    UnboundedExtent(String),

    /// Offscreen capture could not be completed by the backend.
    #[error("Offscreen capture failed: {0}")]
    Offscreen(String),

    /// A cached raster image could not be released.
    #[error("Image release failed: {0}")]
    ImageRelease(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
