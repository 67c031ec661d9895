use shared::domain::ConnectionState;
use tokio::sync::mpsc;
use url::Url;

use crate::{
    connection::ConnectionManager,
    engine::ChatEngine,
    error::ValidationError,
    presenter::{ClientEvent, Presenter},
    transport::TransportEvent,
};

/// Records every render call in order.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<ClientEvent>,
}

impl RecordingPresenter {
    pub fn system_notices(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ClientEvent::System(content) => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn take(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Presenter for RecordingPresenter {
    fn render_chat(&mut self, from: &str, content: &str, is_own: bool) {
        self.events.push(ClientEvent::Chat {
            from: from.to_owned(),
            content: content.to_owned(),
            is_own,
        });
    }

    fn render_system(&mut self, content: &str) {
        self.events.push(ClientEvent::System(content.to_owned()));
    }

    fn render_peer_list(&mut self, names: &[String]) {
        self.events.push(ClientEvent::PeerList(names.to_vec()));
    }

    fn render_identity(&mut self, name: &str) {
        self.events.push(ClientEvent::Identity(name.to_owned()));
    }

    fn render_connection_status(&mut self, state: ConnectionState) {
        self.events.push(ClientEvent::ConnectionStatus(state));
    }

    fn prompt_identity(&mut self) {
        self.events.push(ClientEvent::IdentityRequested);
    }

    fn reject_input(&mut self, error: &ValidationError) {
        self.events.push(ClientEvent::InputRejected(error.clone()));
    }
}

pub fn test_endpoint() -> Url {
    Url::parse("ws://localhost:8081/ws").expect("endpoint")
}

/// Connection wired to an in-memory frame queue instead of a socket.
pub fn attached_connection() -> (ConnectionManager, mpsc::UnboundedReceiver<String>) {
    let (writer, frames) = mpsc::unbounded_channel();
    let mut connection = ConnectionManager::new(test_endpoint());
    connection.attach(writer);
    (connection, frames)
}

/// Engine whose transport has already opened, with render history cleared.
pub fn open_engine() -> (
    ChatEngine<RecordingPresenter>,
    mpsc::UnboundedReceiver<String>,
) {
    let (connection, frames) = attached_connection();
    let mut engine = ChatEngine::new(connection, RecordingPresenter::default());
    engine.handle_transport(TransportEvent::Opened);
    engine.presenter_mut().take();
    (engine, frames)
}

pub fn drain_frames(frames: &mut mpsc::UnboundedReceiver<String>) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    while let Ok(frame) = frames.try_recv() {
        out.push(serde_json::from_str(&frame).expect("outbound frame is json"));
    }
    out
}
