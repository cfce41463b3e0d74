use thiserror::Error;
use wagman_transport::TransportError;

pub type Result<T, E = ClientError> = core::result::Result<T, E>;

/// The device answered, but not in the expected shape (or not in time).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("header not found (got {line:?})")]
    HeaderNotFound { line: String },
    #[error("timed out waiting for the device")]
    Timeout,
    #[error("device disconnected before end of frame")]
    Disconnected,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("protocol: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// Classify a failure while waiting for response lines. A silent or vanished device is a
    /// protocol failure; anything else stays a transport failure.
    pub(crate) fn from_read(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => ProtocolError::Timeout.into(),
            TransportError::Disconnected => ProtocolError::Disconnected.into(),
            other => ClientError::Transport(other),
        }
    }

    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            ClientError::Protocol(p) => Some(p),
            ClientError::Transport(_) => None,
        }
    }
}
