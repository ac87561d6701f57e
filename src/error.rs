//! Error types for the analytics and monitoring core.

use thiserror::Error;

/// Result type alias for analytics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for analytics and monitoring operations
#[derive(Debug, Error)]
pub enum Error {
    /// No training data was provided
    #[error("Empty input: no data provided")]
    EmptyInput,

    /// Inference was requested before the model was fitted
    #[error("Model not fitted: fit() must be called before {0}")]
    ModelNotFitted(String),

    /// Feature vector length differs from the fitted dimensionality
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Too few points or records for the requested operation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
