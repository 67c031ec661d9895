use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use client_core::ClientEvent;

pub const HELP: &str = "commands: /public  /private  /to <name>  /rename <name>  /help  /quit";

/// One line of user input, resolved against whether a name was given yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetIdentity(String),
    Send(String),
    Public,
    Private,
    SelectPeer(String),
    Rename(String),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str, named: bool) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return if named {
                Self::Send(line.to_owned())
            } else {
                Self::SetIdentity(line.to_owned())
            };
        };

        let (verb, arg) = match rest.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim().to_owned()),
            None => (rest, String::new()),
        };
        match verb {
            "public" => Self::Public,
            "private" => Self::Private,
            "to" => Self::SelectPeer(arg),
            "rename" => Self::Rename(arg),
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ if named => Self::Send(line.to_owned()),
            _ => Self::SetIdentity(line.to_owned()),
        }
    }
}

/// Whether the engine has accepted a display name. Only an `Identity` event
/// counts; a name typed before the connection opened is rejected by the
/// engine and leaves this unset.
#[derive(Debug, Clone, Default)]
pub struct IdentityTracker {
    named: Arc<AtomicBool>,
}

impl IdentityTracker {
    pub fn observe(&self, event: &ClientEvent) {
        if let ClientEvent::Identity(_) = event {
            self.named.store(true, Ordering::Release);
        }
    }

    pub fn is_named(&self) -> bool {
        self.named.load(Ordering::Acquire)
    }
}
