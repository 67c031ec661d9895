//! Session and protocol engine for a single-connection chat client.
//!
//! [`ChatClient::connect`] spawns the WebSocket transport and a
//! [`ChatEngine`] task. Transport events and user commands share one FIFO
//! queue, so frames are handled strictly in arrival order and session state
//! has a single owner.

use shared::domain::ConnectionState;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod outbound;
pub mod presenter;
pub mod router;
pub mod session;
pub mod transport;

pub use config::{load_settings, ClientSettings};
pub use connection::ConnectionManager;
pub use engine::{ChatEngine, EngineEvent, UserCommand};
pub use error::{ClientError, SessionError, TransportError, ValidationError};
pub use presenter::{ClientEvent, EventPresenter, Presenter};
pub use router::{MessageRouter, RouteOutcome};
pub use session::SessionState;
pub use transport::TransportEvent;

/// Handle to a running engine. Clones share the same engine; it stops once
/// every handle is dropped and the transport has finished.
#[derive(Clone)]
pub struct ChatClient {
    commands: mpsc::UnboundedSender<EngineEvent>,
    events: broadcast::Sender<ClientEvent>,
}

impl ChatClient {
    /// Connects to `settings.server_url`. The returned receiver is subscribed
    /// before the transport starts, so it observes every event.
    pub fn connect(
        settings: &ClientSettings,
    ) -> Result<(Self, broadcast::Receiver<ClientEvent>), ClientError> {
        let endpoint = settings.endpoint()?;
        let presenter = EventPresenter::new(settings.event_buffer);
        let events = presenter.sender();
        let first_subscriber = presenter.subscribe();

        let (commands, queue) = mpsc::unbounded_channel();
        let mut connection = ConnectionManager::new(endpoint);
        connection.open(settings.connect_timeout(), commands.clone());

        let engine = ChatEngine::new(connection, presenter);
        tokio::spawn(async move {
            let engine = engine.run(queue).await;
            info!(
                closed = engine.connection().state() == ConnectionState::Closed,
                "client: engine stopped"
            );
        });

        Ok((Self { commands, events }, first_subscriber))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn set_identity(&self, name: impl Into<String>) -> Result<(), ClientError> {
        self.submit(UserCommand::SetIdentity(name.into()))
    }

    pub fn send(&self, content: impl Into<String>) -> Result<(), ClientError> {
        self.submit(UserCommand::Send(content.into()))
    }

    pub fn enter_public(&self) -> Result<(), ClientError> {
        self.submit(UserCommand::EnterPublic)
    }

    pub fn enter_private(&self) -> Result<(), ClientError> {
        self.submit(UserCommand::EnterPrivate)
    }

    pub fn select_peer(&self, name: impl Into<String>) -> Result<(), ClientError> {
        self.submit(UserCommand::SelectPeer(name.into()))
    }

    pub fn rename(&self, name: impl Into<String>) -> Result<(), ClientError> {
        self.submit(UserCommand::Rename(name.into()))
    }

    pub fn close(&self) -> Result<(), ClientError> {
        self.submit(UserCommand::Close)
    }

    fn submit(&self, command: UserCommand) -> Result<(), ClientError> {
        self.commands
            .send(EngineEvent::User(command))
            .map_err(|_| ClientError::EngineStopped)
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
