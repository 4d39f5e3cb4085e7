use thiserror::Error;

/// Main error type for the prediction server
#[derive(Error, Debug)]
pub enum MarksixError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Historical data errors
    #[error("No historical draw data available: {0}")]
    DataUnavailable(String),

    #[error("Insufficient draw data: {0}")]
    InsufficientData(String),

    #[error("Invalid draw record: {0}")]
    InvalidDraw(String),

    // Prediction errors
    #[error("Strategy failure: {0}")]
    Strategy(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for MarksixError
pub type Result<T> = std::result::Result<T, MarksixError>;
