//! Conversation summaries and selection state

use crate::models::message::Message;
use crate::models::user::{Participant, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of the conversation with one counterpart
///
/// Materialized by the backend aggregation endpoint; the client keeps no
/// identity for it beyond the counterpart id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// The other side of the conversation
    #[serde(rename = "otherUser")]
    pub other_user: Participant,
    /// Most recent message, for the preview
    #[serde(rename = "lastMessage", default)]
    pub last_message: Option<Message>,
    /// Messages addressed to the current user that are still unread
    #[serde(rename = "unreadCount", default)]
    pub unread_count: u32,
    /// Total number of messages in the conversation
    #[serde(rename = "messageCount", default)]
    pub message_count: u32,
}

impl Conversation {
    /// Conversation with a contact that has no persisted messages yet
    pub fn empty_with(other_user: Participant) -> Self {
        Self {
            other_user,
            last_message: None,
            unread_count: 0,
            message_count: 0,
        }
    }

    /// Counterpart identifier (the store key)
    pub fn counterpart_id(&self) -> &str {
        &self.other_user.id
    }

    /// Timestamp of the last message, if any
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_message.as_ref().map(|m| m.created_at)
    }

    /// Whether any message addressed to the current user is unread
    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }

    /// Preview of the last message, or an empty string
    pub fn preview(&self) -> String {
        self.last_message
            .as_ref()
            .map(Message::preview)
            .unwrap_or_default()
    }
}

/// The conversation currently open in the chat pane
///
/// `Pending` is a contact picked from the directory who has no stored
/// conversation yet; it is synthesized locally and carries empty history
/// and zero counts until a refresh confirms it.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Conversation known to the server
    Confirmed(Conversation),
    /// Contact with no stored conversation
    Pending(User),
}

impl Selection {
    /// Counterpart identifier
    pub fn counterpart_id(&self) -> &str {
        match self {
            Selection::Confirmed(c) => c.counterpart_id(),
            Selection::Pending(u) => &u.id,
        }
    }

    /// Counterpart identity for display
    pub fn counterpart(&self) -> Participant {
        match self {
            Selection::Confirmed(c) => c.other_user.clone(),
            Selection::Pending(u) => Participant::from(u),
        }
    }

    /// Whether this selection is not yet confirmed by the server
    pub fn is_pending(&self) -> bool {
        matches!(self, Selection::Pending(_))
    }

    /// Unread count shown for the selection (always 0 when pending)
    pub fn unread_count(&self) -> u32 {
        match self {
            Selection::Confirmed(c) => c.unread_count,
            Selection::Pending(_) => 0,
        }
    }

    /// Conversation view of the selection
    pub fn conversation(&self) -> Conversation {
        match self {
            Selection::Confirmed(c) => c.clone(),
            Selection::Pending(u) => Conversation::empty_with(Participant::from(u)),
        }
    }
}
