use std::fmt::Display;

use pcgz_common::StateError;
use pcgz_core::lpn::LpnParamsError;
use pcgz_silent_core::{batch::BatchError, convert::ConvertError, expansion};

/// A correlation generation error.
#[derive(Debug, thiserror::Error)]
pub struct PcgError {
    kind: ErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// The kind of a [`PcgError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid parameters or arguments.
    Config,
    /// An operation was called in the wrong state.
    State,
    /// A request exceeds a configured limit.
    ResourceExhausted,
    /// The protocol was aborted, the party can not be used anymore.
    Abort,
}

impl PcgError {
    fn new<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::State, msg.into())
    }

    pub(crate) fn exhausted(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResourceExhausted, msg.into())
    }

    pub(crate) fn abort(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Abort, msg.into())
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` if the error aborted the protocol.
    pub fn is_abort(&self) -> bool {
        self.kind == ErrorKind::Abort
    }
}

impl Display for PcgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ErrorKind::Config => f.write_str("config error")?,
            ErrorKind::State => f.write_str("state error")?,
            ErrorKind::ResourceExhausted => f.write_str("resource exhausted error")?,
            ErrorKind::Abort => f.write_str("abort error")?,
        }

        if let Some(source) = &self.source {
            write!(f, " caused by: {}", source)
        } else {
            Ok(())
        }
    }
}

impl From<std::io::Error> for PcgError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Abort, err)
    }
}

impl From<StateError> for PcgError {
    fn from(err: StateError) -> Self {
        Self::new(ErrorKind::State, err)
    }
}

impl From<LpnParamsError> for PcgError {
    fn from(err: LpnParamsError) -> Self {
        Self::new(ErrorKind::Config, err)
    }
}

impl From<BatchError> for PcgError {
    fn from(err: BatchError) -> Self {
        Self::new(ErrorKind::Config, err)
    }
}

impl From<ConvertError> for PcgError {
    fn from(err: ConvertError) -> Self {
        Self::new(ErrorKind::Abort, err)
    }
}

impl From<expansion::SenderError> for PcgError {
    fn from(err: expansion::SenderError) -> Self {
        let kind = match &err {
            expansion::SenderError::InvalidLength(_) => ErrorKind::Abort,
            expansion::SenderError::InvalidState(_) => ErrorKind::State,
            expansion::SenderError::InvalidParams(_) => ErrorKind::Config,
        };
        Self::new(kind, err)
    }
}

impl From<expansion::ReceiverError> for PcgError {
    fn from(err: expansion::ReceiverError) -> Self {
        let kind = match &err {
            expansion::ReceiverError::InvalidLength(_)
            | expansion::ReceiverError::ConsistencyCheckFailed => ErrorKind::Abort,
            expansion::ReceiverError::InvalidState(_) => ErrorKind::State,
            expansion::ReceiverError::InvalidParams(_) => ErrorKind::Config,
        };
        Self::new(kind, err)
    }
}
