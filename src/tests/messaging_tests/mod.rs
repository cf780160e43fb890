// Tests for the messaging components and the view coordinator

mod composer_tests;
mod conversations_tests;
mod history_tests;

use crate::models::{Conversation, Message, Participant, UserRef};
use chrono::{TimeZone, Utc};

/// Message at a fixed minute of a fixed day
pub(crate) fn message_at(id: &str, sender: &str, receiver: &str, content: &str, minute: u32) -> Message {
    Message {
        id: id.to_string(),
        sender: UserRef::from(sender),
        receiver: UserRef::from(receiver),
        subject: None,
        content: content.to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 3, 2, 10, minute, 0).unwrap(),
        is_read: false,
        appointment: None,
    }
}

/// Summary for `other_id` whose last message was at `minute` (none if `None`)
pub(crate) fn conversation(other_id: &str, minute: Option<u32>, unread: u32) -> Conversation {
    Conversation {
        other_user: Participant {
            id: other_id.to_string(),
            name: format!("User {}", other_id),
            email: format!("{}@school.test", other_id),
        },
        last_message: minute.map(|m| message_at(&format!("m-{}-{}", other_id, m), other_id, "me", "hello", m)),
        unread_count: unread,
        message_count: if minute.is_some() { 1 } else { 0 },
    }
}
