use thiserror::Error;

#[derive(Error, Debug)]
pub enum GepError {
    /// Shape mismatch, missing values or an out-of-range parameter.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Corrupt or incompatible persisted model.
    #[error("Model format error: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GepError>;
