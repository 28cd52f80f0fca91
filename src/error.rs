/// Errors raised by network construction, evaluation and training.
///
/// Every variant is returned before any network parameter is touched, so a
/// failed call never leaves a partially updated network behind.
#[derive(thiserror::Error, Debug)]
pub enum NnError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NnError>;
