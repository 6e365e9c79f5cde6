use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// The model artifact could not be read
    #[error("Model file error: {0}")]
    ModelFile(#[from] std::io::Error),

    /// The model artifact is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The model artifact is valid JSON but not a usable model description
    #[error("Model format error: {0}")]
    ModelFormat(String),

    /// The model uses a feature this predictor does not evaluate
    #[error("Unsupported model feature: {0}")]
    Unsupported(String),

    /// Horizon outside of the accepted range
    #[error("Invalid horizon: {0}")]
    Horizon(String),

    /// Error while building a timeline
    #[error("Timeline error: {0}")]
    Timeline(String),

    /// Error from prediction
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// Error from CSV encoding or decoding
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
