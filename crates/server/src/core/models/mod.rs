use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Recipient value meaning "everyone in the room"
pub const BROADCAST: &str = "Todos";

/// Text of the status message emitted when a participant joins
pub const JOIN_TEXT: &str = "entra na sala...";

/// Text of the status message emitted when a participant is evicted
pub const LEAVE_TEXT: &str = "sai da sala...";

/// A registered chat identity and the time of its last heartbeat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    /// Milliseconds since the Unix epoch
    #[serde(rename = "lastStatus")]
    pub last_heartbeat: i64,
}

impl Participant {
    pub fn new(name: impl Into<String>, last_heartbeat: i64) -> Self {
        Self {
            name: name.into(),
            last_heartbeat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Public message: visible to everyone regardless of `to`
    Message,
    /// Only visible to the sender and the recipient (or everyone, if sent to `Todos`)
    PrivateMessage,
    /// System-generated join/leave notice
    Status,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Message => "message",
            MessageType::PrivateMessage => "private_message",
            MessageType::Status => "status",
        }
    }

    /// Whether a participant may post this type directly
    pub fn is_user_generated(&self) -> bool {
        !matches!(self, MessageType::Status)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown message type '{0}'")]
pub struct UnknownMessageType(pub String);

impl FromStr for MessageType {
    type Err = UnknownMessageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(MessageType::Message),
            "private_message" => Ok(MessageType::PrivateMessage),
            "status" => Ok(MessageType::Status),
            other => Err(UnknownMessageType(other.to_string())),
        }
    }
}

/// A stored chat message. Never modified after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Local wall-clock time of insertion, `HH:mm:ss`
    pub time: String,
}

impl Message {
    /// Broadcast status notice for `name` (join or leave)
    pub fn status(name: impl Into<String>, text: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            from: name.into(),
            to: BROADCAST.to_string(),
            text: text.into(),
            message_type: MessageType::Status,
            time: time.into(),
        }
    }
}

/// Body of `POST /participants`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateParticipantInput {
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /messages`
///
/// Fields are kept as raw strings so that every shape problem can be
/// reported at once instead of failing on the first bad field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMessageInput {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub message_type: String,
}

/// Query string of `GET /messages`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<String>,
}
