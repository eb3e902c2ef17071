use thiserror::Error;

/// Common error type for store operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid series name: {0}")]
    InvalidName(String),
    #[error("Not configured: {0}")]
    NotConfigured(String),
    #[error("Aggregation not applicable: {0}")]
    AggregationNotApplicable(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("Derivation error: {0}")]
    DerivationError(String),
    #[error("Action never run: {0}")]
    NeverRun(String),
    #[error("Out of order timestamp: {0}")]
    OutOfOrder(String),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
