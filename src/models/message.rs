//! Messages as stored by the backend

use crate::models::user::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters shown in a conversation preview
pub const PREVIEW_CHARS: usize = 40;

/// Appointment associated with a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppointmentRef {
    /// Bare identifier
    Id(String),
    /// Populated appointment document (only the id is kept)
    Populated {
        /// Appointment identifier
        #[serde(rename = "_id", alias = "id")]
        id: String,
    },
}

impl AppointmentRef {
    /// Identifier of the appointment
    pub fn id(&self) -> &str {
        match self {
            AppointmentRef::Id(id) => id,
            AppointmentRef::Populated { id } => id,
        }
    }
}

/// An immutable message
///
/// Only the read flag can change, and only by re-fetching from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Sender
    pub sender: UserRef,
    /// Receiver
    pub receiver: UserRef,
    /// Subject line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Text content
    pub content: String,
    /// Server-assigned creation time
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Whether the receiver has read the message
    #[serde(rename = "isRead", default)]
    pub is_read: bool,
    /// Associated appointment, if any
    #[serde(default)]
    pub appointment: Option<AppointmentRef>,
}

impl Message {
    /// Sender identifier
    pub fn sender_id(&self) -> &str {
        self.sender.id()
    }

    /// Receiver identifier
    pub fn receiver_id(&self) -> &str {
        self.receiver.id()
    }

    /// Whether `user_id` sent this message
    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender_id() == user_id
    }

    /// Whether this message is unread and addressed to `user_id`
    pub fn is_unread_for(&self, user_id: &str) -> bool {
        !self.is_read && self.receiver_id() == user_id
    }

    /// Whether this message belongs to the conversation between `a` and `b`
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.sender_id() == a && self.receiver_id() == b)
            || (self.sender_id() == b && self.receiver_id() == a)
    }

    /// Short single-line preview of the content
    ///
    /// Uses the first non-blank line; `...` marks anything cut off.
    pub fn preview(&self) -> String {
        let mut lines = self.content.lines().map(str::trim).filter(|l| !l.is_empty());
        let line = lines.next().unwrap_or_default();
        let mut chars = line.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        if chars.next().is_some() || lines.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}

/// Body of `POST /api/messages/send`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Receiver identifier
    pub receiver: String,
    /// Subject line
    pub subject: String,
    /// Message text
    pub content: String,
    /// Associated appointment (always null from the messaging view)
    pub appointment: Option<String>,
}

impl SendMessageRequest {
    /// Create a request with no associated appointment
    pub fn new(receiver: impl Into<String>, subject: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            subject: subject.into(),
            content: content.into(),
            appointment: None,
        }
    }
}
