use shared::{domain::ConnectionState, protocol::ClientRequest};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    connection::ConnectionManager,
    error::{ClientError, TransportError, ValidationError},
    outbound,
    presenter::Presenter,
    router::{MessageRouter, RouteOutcome},
    session::SessionState,
    transport::TransportEvent,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    SetIdentity(String),
    Send(String),
    EnterPublic,
    EnterPrivate,
    SelectPeer(String),
    Rename(String),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Transport(TransportEvent),
    User(UserCommand),
}

impl From<TransportEvent> for EngineEvent {
    fn from(value: TransportEvent) -> Self {
        Self::Transport(value)
    }
}

impl From<UserCommand> for EngineEvent {
    fn from(value: UserCommand) -> Self {
        Self::User(value)
    }
}

/// Single owner of connection and session state. Every mutation happens in
/// one of the handlers below, one event at a time.
pub struct ChatEngine<P: Presenter> {
    connection: ConnectionManager,
    session: SessionState,
    router: MessageRouter,
    presenter: P,
}

impl<P: Presenter> ChatEngine<P> {
    pub fn new(connection: ConnectionManager, presenter: P) -> Self {
        Self {
            connection,
            session: SessionState::new(),
            router: MessageRouter::new(),
            presenter,
        }
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Drains `events` in arrival order until every sender is gone.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<EngineEvent>) -> Self {
        while let Some(event) = events.recv().await {
            if let Err(err) = self.handle(event) {
                debug!(error = %err, "engine: command not applied");
            }
        }
        info!(state = %self.connection.state(), "engine: event queue closed");
        self
    }

    pub fn handle(&mut self, event: EngineEvent) -> Result<(), ClientError> {
        match event {
            EngineEvent::Transport(event) => {
                self.handle_transport(event);
                Ok(())
            }
            EngineEvent::User(command) => self.handle_user(command),
        }
    }

    pub fn handle_transport(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => {
                if self.connection.on_opened() {
                    self.presenter
                        .render_connection_status(ConnectionState::Open);
                    self.presenter.prompt_identity();
                }
            }
            TransportEvent::Frame(raw) => {
                let outcome = self
                    .router
                    .on_frame(&raw, &mut self.session, &mut self.presenter);
                if outcome != RouteOutcome::Malformed {
                    debug!(?outcome, "engine: frame routed");
                }
            }
            TransportEvent::Errored(reason) => {
                if self.connection.on_errored() {
                    warn!(%reason, "engine: transport error");
                    self.presenter
                        .render_system(&format!("connection error: {reason}"));
                    self.presenter
                        .render_connection_status(ConnectionState::Errored);
                }
            }
            TransportEvent::Closed => {
                if self.connection.on_closed() {
                    self.presenter.render_system("disconnected from server");
                    self.presenter
                        .render_connection_status(ConnectionState::Closed);
                }
            }
        }
    }

    pub fn handle_user(&mut self, command: UserCommand) -> Result<(), ClientError> {
        match command {
            UserCommand::SetIdentity(name) => self.set_identity(&name),
            UserCommand::Send(content) => self.send_current(&content).map(|_| ()),
            UserCommand::EnterPublic => {
                self.enter_public();
                Ok(())
            }
            UserCommand::EnterPrivate => self.enter_private(),
            UserCommand::SelectPeer(name) => self.select_peer(&name),
            UserCommand::Rename(name) => self.rename(&name),
            UserCommand::Close => {
                self.close();
                Ok(())
            }
        }
    }

    /// Completes the handshake with the name typed at the initial prompt.
    /// Nothing changes unless the connection is open and the rename frame
    /// was handed to the transport.
    pub fn set_identity(&mut self, raw: &str) -> Result<(), ClientError> {
        let state = self.connection.state();
        if !state.is_open() {
            warn!(%state, "engine: display name submitted before connection opened");
            return Err(TransportError::NotOpen { state }.into());
        }
        let name = self.validated(raw, outbound::validate_identity)?;
        self.connection.send(&outbound::rename(name.clone()))?;
        self.session.set_identity(name.clone());
        self.presenter.render_identity(&name);
        self.presenter
            .render_system(&format!("your display name is set to {name}"));
        self.presenter
            .render_connection_status(self.connection.state());
        Ok(())
    }

    /// Optimistic local rename; a server `rename` frame has the final say.
    pub fn rename(&mut self, raw: &str) -> Result<(), ClientError> {
        let name = self.validated(raw, outbound::validate_identity)?;
        self.session.set_identity(name.clone());
        self.presenter.render_identity(&name);
        self.connection.send(&outbound::rename(name))
    }

    /// Sends `raw` in the current mode. Returns the request that went out,
    /// or `None` when private mode has no peer to address.
    pub fn send_current(&mut self, raw: &str) -> Result<Option<ClientRequest>, ClientError> {
        let content = self.validated(raw, outbound::validate_content)?;
        let Some(request) = outbound::current_request(&self.session, &content) else {
            debug!("engine: private mode without a selected peer, nothing sent");
            return Ok(None);
        };
        self.connection.send(&request)?;
        Ok(Some(request))
    }

    pub fn enter_private(&mut self) -> Result<(), ClientError> {
        self.session.enter_private();
        self.presenter.render_system("fetching online users...");
        self.connection.send(&outbound::who())
    }

    pub fn enter_public(&mut self) {
        self.session.enter_public();
    }

    pub fn select_peer(&mut self, raw: &str) -> Result<(), ClientError> {
        let name = self.validated(raw, outbound::validate_peer)?;
        self.session.select_peer(name.clone())?;
        self.presenter
            .render_system(&format!("private chat with {name}"));
        Ok(())
    }

    pub fn close(&mut self) {
        self.connection.close();
    }

    fn validated(
        &mut self,
        raw: &str,
        validate: fn(&str) -> Result<&str, ValidationError>,
    ) -> Result<String, ClientError> {
        match validate(raw) {
            Ok(value) => Ok(value.to_owned()),
            Err(err) => {
                self.presenter.reject_input(&err);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
