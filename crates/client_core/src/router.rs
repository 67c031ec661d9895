use shared::protocol::InboundMessage;
use tracing::{debug, warn};

use crate::{presenter::Presenter, session::SessionState};

const PRIVATE_PREFIX: &str = "(private) ";

/// What happened to a single inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Dispatched(&'static str),
    Malformed,
    Unrecognized,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouterStats {
    pub dispatched: u64,
    pub malformed: u64,
    pub unrecognized: u64,
}

/// Decodes inbound frames and hands each one to exactly one handler.
/// Protocol faults become a system notice and never affect the connection.
#[derive(Debug, Default)]
pub struct MessageRouter {
    stats: RouterStats,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    pub fn on_frame<P: Presenter + ?Sized>(
        &mut self,
        raw: &str,
        session: &mut SessionState,
        presenter: &mut P,
    ) -> RouteOutcome {
        let message = match InboundMessage::decode(raw) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "router: malformed frame");
                self.stats.malformed += 1;
                presenter.render_system(&format!("could not parse server message: {raw}"));
                return RouteOutcome::Malformed;
            }
        };

        let kind = message.kind();
        match message {
            InboundMessage::System { content } => presenter.render_system(&content),
            InboundMessage::Chat { from, content } => {
                presenter.render_chat(&from, &content, session.is_own(&from));
            }
            InboundMessage::Private { from, content } => {
                let content = format!("{PRIVATE_PREFIX}{content}");
                presenter.render_chat(&from, &content, session.is_own(&from));
            }
            InboundMessage::UserList { users } => {
                let peers = session.replace_peers(users);
                presenter.render_peer_list(peers);
            }
            InboundMessage::Rename { new_name } => handle_rename(new_name, session, presenter),
            InboundMessage::Unknown { raw } => {
                warn!(frame = %raw, "router: unrecognized frame type");
                self.stats.unrecognized += 1;
                presenter.render_system(&format!("received unknown message: {raw}"));
                return RouteOutcome::Unrecognized;
            }
        }

        debug!(kind, "router: frame dispatched");
        self.stats.dispatched += 1;
        RouteOutcome::Dispatched(kind)
    }
}

// The server is authoritative for our name, whatever we set locally.
fn handle_rename<P: Presenter + ?Sized>(
    new_name: String,
    session: &mut SessionState,
    presenter: &mut P,
) {
    presenter.render_identity(&new_name);
    presenter.render_system(&format!("your display name is now {new_name}"));
    session.set_identity(new_name);
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
