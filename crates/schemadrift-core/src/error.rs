use thiserror::Error;

/// Core error type shared across schemadrift crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// The database snapshot violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// The model snapshot is malformed or inconsistent.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// Comparison configuration could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A requested engine or feature is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by schemadrift crates.
pub type Result<T> = std::result::Result<T, Error>;
