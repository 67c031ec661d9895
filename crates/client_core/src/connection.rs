use std::time::Duration;

use shared::{domain::ConnectionState, protocol::ClientRequest};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::{ClientError, TransportError},
    transport::{self, TransportEvent},
};

/// Owns the connection state and the outbound frame queue of the transport.
///
/// State only moves in response to transport events. Sends are fire and
/// forget: a frame offered while the connection is not open is dropped and
/// reported to the caller, never buffered.
pub struct ConnectionManager {
    endpoint: Url,
    state: ConnectionState,
    writer: Option<mpsc::UnboundedSender<String>>,
}

impl ConnectionManager {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            state: ConnectionState::Connecting,
            writer: None,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Starts the WebSocket transport. Lifecycle events and inbound frames
    /// are delivered on `events`.
    pub fn open<E>(&mut self, connect_timeout: Duration, events: mpsc::UnboundedSender<E>)
    where
        E: From<TransportEvent> + Send + 'static,
    {
        info!(url = %self.endpoint, "connection: opening");
        self.state = ConnectionState::Connecting;
        let writer = transport::spawn(self.endpoint.clone(), connect_timeout, events);
        self.attach(writer);
    }

    /// Installs the queue drained by the transport writer.
    pub fn attach(&mut self, writer: mpsc::UnboundedSender<String>) {
        self.writer = Some(writer);
    }

    pub fn on_opened(&mut self) -> bool {
        if self.state != ConnectionState::Connecting {
            debug!(state = %self.state, "connection: ignoring open event");
            return false;
        }
        self.state = ConnectionState::Open;
        info!(url = %self.endpoint, "connection: open");
        true
    }

    /// Errors leave the transport in place; it reports its own close.
    pub fn on_errored(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = ConnectionState::Errored;
        true
    }

    pub fn on_closed(&mut self) -> bool {
        if self.state == ConnectionState::Closed {
            return false;
        }
        self.state = ConnectionState::Closed;
        self.writer = None;
        info!(url = %self.endpoint, "connection: closed");
        true
    }

    /// Asks the transport to shut down. The state changes once the
    /// transport confirms with a close event.
    pub fn close(&mut self) {
        if self.writer.take().is_some() {
            info!(url = %self.endpoint, "connection: close requested");
        }
    }

    pub fn send(&self, request: &ClientRequest) -> Result<(), ClientError> {
        if !self.state.is_open() {
            warn!(kind = request.kind(), state = %self.state, "connection: dropping outbound frame");
            return Err(TransportError::NotOpen { state: self.state }.into());
        }
        let frame = request.encode()?;
        let writer = self.writer.as_ref().ok_or(TransportError::WriterClosed)?;
        writer
            .send(frame)
            .map_err(|_| TransportError::WriterClosed)?;
        debug!(kind = request.kind(), "connection: frame queued");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/connection_tests.rs"]
mod tests;
