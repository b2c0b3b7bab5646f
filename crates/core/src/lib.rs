pub mod connection;
pub mod message;
pub mod phase;
pub mod progress;
pub mod student;

use serde::{Deserialize, Serialize};

/// A side effect the backend declares alongside a chat reply.
///
/// The backend has already executed the command by the time the client sees
/// it. The client never interprets the payload; a non-empty list only tells it
/// that the learner's state changed and the local snapshot is stale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Command {
    /// Human-readable summary, shown next to the assistant message.
    #[serde(default)]
    pub description: String,
    /// Backend-side command name (e.g. `approve_topic`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Opaque command arguments.
    #[serde(default)]
    pub params: serde_json::Value,
    /// Any other fields the backend attaches.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Command {
    /// Creates a command carrying only a description.
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }
}
