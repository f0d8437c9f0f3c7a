use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("unknown priority: {0}")]
    UnknownPriority(String),
    #[error("unknown error type: {0}")]
    UnknownErrorType(String),
}
