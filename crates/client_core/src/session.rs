use shared::domain::ChatMode;

use crate::error::SessionError;

/// Identity, addressing mode and peer roster for the single connection.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    identity: Option<String>,
    mode: ChatMode,
    selected_peer: Option<String>,
    peers: Vec<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn has_identity(&self) -> bool {
        self.identity.is_some()
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn selected_peer(&self) -> Option<&str> {
        self.selected_peer.as_deref()
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// Callers validate `name`; both local renames and server confirmations
    /// land here and the latest write wins.
    pub fn set_identity(&mut self, name: impl Into<String>) {
        self.identity = Some(name.into());
    }

    pub fn is_own(&self, from: &str) -> bool {
        self.identity.as_deref() == Some(from)
    }

    pub fn enter_private(&mut self) {
        self.mode = ChatMode::Private;
        self.selected_peer = None;
    }

    pub fn enter_public(&mut self) {
        self.mode = ChatMode::Public;
        self.selected_peer = None;
    }

    pub fn select_peer(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        if self.mode != ChatMode::Private {
            return Err(SessionError::NotPrivate);
        }
        self.selected_peer = Some(name.into());
        Ok(())
    }

    /// Replaces the roster with `users`, dropping our own name and repeats.
    pub fn replace_peers(&mut self, users: Vec<String>) -> &[String] {
        let mut peers: Vec<String> = Vec::with_capacity(users.len());
        for user in users {
            if self.is_own(&user) || peers.contains(&user) {
                continue;
            }
            peers.push(user);
        }
        self.peers = peers;
        &self.peers
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
