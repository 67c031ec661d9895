//! JSON frames exchanged with the chat server. Every frame is one object whose
//! `type` field selects the variant.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// Frames pushed by the server.
///
/// The server omits empty fields, so `content` and `users` fall back to their
/// empty values when absent. Frames whose `type` is missing or not one of the
/// known kinds decode to [`InboundMessage::Unknown`] carrying the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    System {
        #[serde(default)]
        content: String,
    },
    Chat {
        from: String,
        #[serde(default)]
        content: String,
    },
    Private {
        from: String,
        #[serde(default)]
        content: String,
    },
    UserList {
        #[serde(default, deserialize_with = "null_as_default")]
        users: Vec<String>,
    },
    Rename {
        #[serde(rename = "newName")]
        new_name: String,
    },
    #[serde(skip)]
    Unknown { raw: String },
}

impl InboundMessage {
    pub const KNOWN_KINDS: [&'static str; 5] = ["system", "chat", "private", "user_list", "rename"];

    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|source| ProtocolError::InvalidJson { source })?;

        let kind = match value.get("type").and_then(Value::as_str) {
            Some(kind) if Self::KNOWN_KINDS.contains(&kind) => kind.to_owned(),
            _ => {
                return Ok(Self::Unknown {
                    raw: raw.to_owned(),
                })
            }
        };

        serde_json::from_value(value).map_err(|source| ProtocolError::InvalidShape { kind, source })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::Chat { .. } => "chat",
            Self::Private { .. } => "private",
            Self::UserList { .. } => "user_list",
            Self::Rename { .. } => "rename",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// The four requests a client may issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    Chat {
        content: String,
    },
    Private {
        to: String,
        content: String,
    },
    Who,
    Rename {
        #[serde(rename = "newName")]
        new_name: String,
    },
}

impl ClientRequest {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chat { .. } => "chat",
            Self::Private { .. } => "private",
            Self::Who => "who",
            Self::Rename { .. } => "rename",
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
