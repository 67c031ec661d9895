use shared::{domain::ConnectionState, error::ProtocolError};
use thiserror::Error;

/// Local input rejected before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("display name must not be empty")]
    EmptyIdentity,
    #[error("message must not be empty")]
    EmptyContent,
    #[error("peer name must not be empty")]
    EmptyPeer,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a peer can only be selected in private mode")]
    NotPrivate,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection is {state}; frame dropped")]
    NotOpen { state: ConnectionState },
    #[error("transport writer has shut down")]
    WriterClosed,
    #[error("invalid server url '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("connecting to {url} timed out after {seconds}s")]
    ConnectTimeout { url: String, seconds: u64 },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("chat engine is no longer running")]
    EngineStopped,
}
