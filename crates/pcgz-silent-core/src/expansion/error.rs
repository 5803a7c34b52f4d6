use pcgz_core::lpn::LpnError;

use crate::spcot;

/// An expansion sender error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error("invalid length: {0}")]
    InvalidLength(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl From<spcot::error::SenderError> for SenderError {
    fn from(err: spcot::error::SenderError) -> Self {
        match err {
            spcot::error::SenderError::InvalidLength(msg) => SenderError::InvalidLength(msg),
        }
    }
}

impl From<LpnError> for SenderError {
    fn from(err: LpnError) -> Self {
        SenderError::InvalidLength(err.to_string())
    }
}

/// An expansion receiver error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error("invalid length: {0}")]
    InvalidLength(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("consistency check failed")]
    ConsistencyCheckFailed,
}

impl From<spcot::error::ReceiverError> for ReceiverError {
    fn from(err: spcot::error::ReceiverError) -> Self {
        use spcot::error::ReceiverError as E;

        match err {
            E::InvalidInput(msg) | E::InvalidLength(msg) => ReceiverError::InvalidLength(msg),
            E::InvalidState(msg) => ReceiverError::InvalidState(msg),
            E::ConsistencyCheckFailed => ReceiverError::ConsistencyCheckFailed,
        }
    }
}

impl From<LpnError> for ReceiverError {
    fn from(err: LpnError) -> Self {
        ReceiverError::InvalidLength(err.to_string())
    }
}
