//! Error types for the scenario and configuration layers
//!
//! The physics step itself never fails: bad parameter values are clamped and
//! degenerate geometry is skipped. Only data arriving from outside (scenario
//! tokens, parameter files) can produce a [`SimError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Token is not valid URL-safe base64
    #[error("scenario token is not valid base64: {0}")]
    TokenEncoding(#[from] base64::DecodeError),

    /// Payload is not valid JSON, or has the wrong shape
    #[error("scenario payload is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// Parameter file could not be read
    #[error("failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON has no representation for NaN or infinity
    #[error("scenario parameter '{key}' is not a finite number")]
    NonFinite { key: String },

    /// A required top-level scenario key is absent
    #[error("scenario is missing required key '{key}'")]
    MissingKey { key: &'static str },

    /// A required top-level scenario key holds the wrong JSON type
    #[error("scenario key '{key}' must be {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;
