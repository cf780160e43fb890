//! Message composer and sender
//!
//! Validates input before any network call, allows one send in flight per
//! composer, and keeps the draft when a send fails so the user can retry.
//! A successful send is never trusted locally: the view re-pulls history and
//! summaries from the server.

use crate::models::{Message, SendMessageRequest};
use crate::session::Session;
use crate::transport::ApiClient;
use crate::{Result, ValidationError};
use tracing::{info, warn};

/// Shown when a send fails without a server-supplied message
pub const SEND_FAILED_FALLBACK: &str = "Failed to send message. Please try again.";

/// Check a draft against the send preconditions
///
/// Returns the trimmed text to send.
pub fn validate_message(
    text: &str,
    counterpart_id: Option<&str>,
    self_id: &str,
    max_len: usize,
) -> std::result::Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }

    let counterpart_id = match counterpart_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ValidationError::NoConversationSelected),
    };

    if counterpart_id == self_id {
        return Err(ValidationError::SelfAddressed);
    }

    if trimmed.chars().count() > max_len {
        return Err(ValidationError::MessageTooLong { max: max_len });
    }

    Ok(trimmed.to_string())
}

/// Validate and submit one message to `counterpart_id`
///
/// # Example
/// ```rust,no_run
/// use portal_messaging::messaging::send_message;
/// use portal_messaging::models::{Role, User};
/// use portal_messaging::{ApiClient, Session, Settings};
///
/// # async fn example() -> portal_messaging::Result<()> {
/// let settings = Settings::default();
/// let session = Session::new(User::new("s1", "Sam", "sam@example.com", Role::Student), "token")?;
/// let api = ApiClient::for_session(&settings, &session)?;
///
/// let message = send_message(&api, &session, "t1", "Hi", settings.max_message_length).await?;
/// println!("Stored as {} at {}", message.id, message.created_at);
/// # Ok(())
/// # }
/// ```
pub async fn send_message(
    api: &ApiClient,
    session: &Session,
    counterpart_id: &str,
    text: &str,
    max_len: usize,
) -> Result<Message> {
    let content = validate_message(text, Some(counterpart_id), session.user_id(), max_len)?;
    let request = SendMessageRequest::new(counterpart_id, session.message_subject(), content);

    match api.send_message(&request).await {
        Ok(message) => {
            info!("Message {} sent to {}", message.id, counterpart_id);
            Ok(message)
        }
        Err(e) => {
            warn!("Failed to send message to {}: {}", counterpart_id, e);
            Err(e)
        }
    }
}

/// Composer state for the chat pane
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    draft: String,
    sending: bool,
    error: Option<String>,
}

impl Composer {
    /// Create an empty composer
    pub fn new() -> Self {
        Self::default()
    }

    /// Current draft text
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft text
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Whether a send is in flight
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Inline error shown next to the form
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the send button should be enabled
    pub fn can_submit(&self) -> bool {
        !self.sending && !self.draft.trim().is_empty()
    }

    /// Clear draft and error (selection change)
    pub fn clear(&mut self) {
        self.draft.clear();
        self.error = None;
    }

    /// Start a send of the current draft
    ///
    /// Fails with a validation error (recorded inline) when the draft is not
    /// sendable or another send is in flight. On success the composer is
    /// marked as sending and the trimmed content is returned.
    pub fn begin_send(
        &mut self,
        counterpart_id: Option<&str>,
        self_id: &str,
        max_len: usize,
    ) -> std::result::Result<String, ValidationError> {
        if self.sending {
            return Err(ValidationError::SendInProgress);
        }

        match validate_message(&self.draft, counterpart_id, self_id, max_len) {
            Ok(content) => {
                self.sending = true;
                self.error = None;
                Ok(content)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Record the outcome of a send started with [`begin_send`](Self::begin_send)
    ///
    /// `still_selected` tells whether the conversation the message went to
    /// is still open; the draft and error are only touched in that case.
    pub fn finish_send(&mut self, outcome: &Result<Message>, still_selected: bool) {
        self.sending = false;
        match outcome {
            Ok(_) => {
                if still_selected {
                    self.draft.clear();
                }
                self.error = None;
            }
            Err(e) => {
                if still_selected {
                    self.error = Some(e.user_message(SEND_FAILED_FALLBACK));
                }
            }
        }
    }
}
