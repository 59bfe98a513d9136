//! Analysis error type and the public-boundary guard.
//!
//! Every analyzer returns [`AnalysisResult`]. At the public boundary the
//! result is either rendered as the success structure or as
//! `{"error": "<message>"}`, which is the shape downstream formatters check for.

use serde::Serialize;
use std::panic::{self, UnwindSafe};
use thiserror::Error;
use tracing::warn;

/// Errors produced by the analytics layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The input collection was empty
    #[error("No games provided for {0}")]
    NoGames(&'static str),

    /// A required input was missing, null or zero
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// An input was present but unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Data was present but not enough of it qualified for the analysis
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// An upstream response could not be parsed
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// An analyzer failed unexpectedly
    #[error("Internal analysis error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Parse(err.to_string())
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Run an analyzer body, converting a panic into [`AnalysisError::Internal`].
pub fn guarded<T, F>(label: &str, f: F) -> AnalysisResult<T>
where
    F: FnOnce() -> AnalysisResult<T> + UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(result) => result,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            warn!(analysis = label, error = %message, "Analyzer panicked");
            Err(AnalysisError::Internal(format!("{}: {}", label, message)))
        }
    }
}

/// Render a result for the formatting layer.
pub fn to_response<T: Serialize>(result: AnalysisResult<T>) -> serde_json::Value {
    match result {
        Ok(value) => serde_json::to_value(value).unwrap_or_else(|e| {
            serde_json::json!({ "error": AnalysisError::Internal(e.to_string()).to_string() })
        }),
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    }
}
