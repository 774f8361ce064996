use thiserror::Error;

/// Fatal problems that stop a comparison before any report is produced.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error(
        "The TablesToIgnoreCommaDelimited config property contains a table name of '{0}', which was not found in the database"
    )]
    IgnoredTableNotFound(String),
    #[error(transparent)]
    Core(#[from] schemadrift_core::Error),
}

pub type Result<T> = std::result::Result<T, CompareError>;
