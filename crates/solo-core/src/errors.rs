use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("store error: {0}")]
    Store(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("malformed {table} document: {reason}")]
    Malformed { table: String, reason: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RepositoryError {
    pub fn malformed(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            table: table.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a management service; always wraps the lower-level cause.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
