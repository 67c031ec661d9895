//! Presentation-layer seam. The engine pushes render calls through
//! [`Presenter`] and never reads anything back.

use shared::domain::ConnectionState;
use tokio::sync::broadcast;

use crate::error::ValidationError;

pub trait Presenter: Send {
    fn render_chat(&mut self, from: &str, content: &str, is_own: bool);
    fn render_system(&mut self, content: &str);
    fn render_peer_list(&mut self, names: &[String]);
    fn render_identity(&mut self, name: &str);
    fn render_connection_status(&mut self, state: ConnectionState);

    /// Called once the transport is open and a display name is needed.
    fn prompt_identity(&mut self) {}

    /// Inline cue for input that failed local validation.
    fn reject_input(&mut self, _error: &ValidationError) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Chat {
        from: String,
        content: String,
        is_own: bool,
    },
    System(String),
    PeerList(Vec<String>),
    Identity(String),
    ConnectionStatus(ConnectionState),
    IdentityRequested,
    InputRejected(ValidationError),
}

/// Publishes every render call as a [`ClientEvent`] on a broadcast channel.
pub struct EventPresenter {
    events: broadcast::Sender<ClientEvent>,
}

impl EventPresenter {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self { events }
    }

    pub fn sender(&self) -> broadcast::Sender<ClientEvent> {
        self.events.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: ClientEvent) {
        // No subscribers is not an error; the event is simply unobserved.
        let _ = self.events.send(event);
    }
}

impl Presenter for EventPresenter {
    fn render_chat(&mut self, from: &str, content: &str, is_own: bool) {
        self.publish(ClientEvent::Chat {
            from: from.to_owned(),
            content: content.to_owned(),
            is_own,
        });
    }

    fn render_system(&mut self, content: &str) {
        self.publish(ClientEvent::System(content.to_owned()));
    }

    fn render_peer_list(&mut self, names: &[String]) {
        self.publish(ClientEvent::PeerList(names.to_vec()));
    }

    fn render_identity(&mut self, name: &str) {
        self.publish(ClientEvent::Identity(name.to_owned()));
    }

    fn render_connection_status(&mut self, state: ConnectionState) {
        self.publish(ClientEvent::ConnectionStatus(state));
    }

    fn prompt_identity(&mut self) {
        self.publish(ClientEvent::IdentityRequested);
    }

    fn reject_input(&mut self, error: &ValidationError) {
        self.publish(ClientEvent::InputRejected(error.clone()));
    }
}
