use thiserror::Error;

pub type Result<T> = std::result::Result<T, TriageError>;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("captured image payload is empty")]
    EmptyImage,

    #[error("image payload is not valid base64: {0}")]
    InvalidImage(String),

    #[error("analysis requested without a captured image")]
    NoCapturedImage,

    #[error("stale analysis outcome: ticket epoch {ticket} does not match session epoch {current}")]
    StaleOutcome { ticket: u64, current: u64 },

    #[error("session storage error: {0}")]
    StorageError(String),
}
