//! Builds the four outbound requests from session state.

use shared::{domain::ChatMode, protocol::ClientRequest};

use crate::{error::ValidationError, session::SessionState};

pub fn chat(content: impl Into<String>) -> ClientRequest {
    ClientRequest::Chat {
        content: content.into(),
    }
}

pub fn private(to: impl Into<String>, content: impl Into<String>) -> ClientRequest {
    ClientRequest::Private {
        to: to.into(),
        content: content.into(),
    }
}

pub fn who() -> ClientRequest {
    ClientRequest::Who
}

pub fn rename(new_name: impl Into<String>) -> ClientRequest {
    ClientRequest::Rename {
        new_name: new_name.into(),
    }
}

/// Request for `content` under the current mode, or `None` when private mode
/// has no peer selected.
pub fn current_request(session: &SessionState, content: &str) -> Option<ClientRequest> {
    match (session.mode(), session.selected_peer()) {
        (ChatMode::Public, _) => Some(chat(content)),
        (ChatMode::Private, Some(peer)) => Some(private(peer, content)),
        (ChatMode::Private, None) => None,
    }
}

pub fn validate_content(raw: &str) -> Result<&str, ValidationError> {
    non_blank(raw).ok_or(ValidationError::EmptyContent)
}

pub fn validate_identity(raw: &str) -> Result<&str, ValidationError> {
    non_blank(raw).ok_or(ValidationError::EmptyIdentity)
}

pub fn validate_peer(raw: &str) -> Result<&str, ValidationError> {
    non_blank(raw).ok_or(ValidationError::EmptyPeer)
}

fn non_blank(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
#[path = "tests/outbound_tests.rs"]
mod tests;
