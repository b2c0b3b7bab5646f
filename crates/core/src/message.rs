//! Chat transcript
//!
//! Messages are immutable once appended and the transcript only grows. The
//! order of entries is the display order; nothing is ever reordered or removed.

use crate::Command;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Commands the backend declared with this reply. Always empty for user
    /// messages and error entries.
    pub commands: Vec<Command>,
    pub is_error: bool,
}

impl Message {
    /// Descriptions of the attached commands, in backend order.
    pub fn command_descriptions(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.description.as_str())
    }
}

/// Content for a message that has not been appended yet. The transcript
/// assigns the id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub role: Role,
    pub text: String,
    pub commands: Vec<Command>,
    pub is_error: bool,
}

impl NewMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            commands: Vec::new(),
            is_error: false,
        }
    }

    pub fn assistant(text: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            commands,
            is_error: false,
        }
    }

    /// A synthetic assistant entry standing in for a failed reply.
    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            commands: Vec::new(),
            is_error: true,
        }
    }
}

/// Append-only, ordered sequence of messages for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message, stamping it with the next id and the current time.
    /// Returns a reference to the stored entry.
    pub fn append(&mut self, message: NewMessage) -> &Message {
        self.append_at(message, Utc::now())
    }

    /// Same as [`Transcript::append`] with an explicit timestamp.
    pub fn append_at(&mut self, message: NewMessage, timestamp: DateTime<Utc>) -> &Message {
        self.next_id += 1;
        self.messages.push(Message {
            id: self.next_id,
            role: message.role,
            text: message.text,
            timestamp,
            commands: message.commands,
            is_error: message.is_error,
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, id: u64) -> Option<&Message> {
        // Ids are dense and start at 1.
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.messages.get(index)
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
