/// A SPCOT sender error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error("invalid length: {0}")]
    InvalidLength(String),
}

/// A SPCOT receiver error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid length: {0}")]
    InvalidLength(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("consistency check failed")]
    ConsistencyCheckFailed,
}
