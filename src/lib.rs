//! Portal Messaging - conversation client for the appointment portal
//!
//! This library turns the portal's flat, timestamped message store into a
//! stateful conversation view for students, teachers and admins: polling
//! refresh, server-reconciled sends, unread tracking and role-aware contact
//! discovery.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod messaging;
pub mod models;
pub mod session;
pub mod settings;
pub mod transport;

pub use messaging::{MessagingView, ViewPhase, ViewSnapshot};
pub use session::Session;
pub use settings::Settings;
pub use transport::ApiClient;

/// Result type alias for portal messaging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Client-side validation failures, raised before any network call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Message text is empty after trimming
    #[error("Please type a message")]
    EmptyMessage,

    /// No conversation or contact is selected
    #[error("Please select a conversation")]
    NoConversationSelected,

    /// Message text exceeds the configured maximum length
    #[error("Message is too long (max {max} characters)")]
    MessageTooLong {
        /// Maximum number of characters allowed
        max: usize,
    },

    /// Receiver is the current user
    #[error("You cannot send a message to yourself")]
    SelfAddressed,

    /// A send is already in flight for this composer
    #[error("A message is already being sent")]
    SendInProgress,

    /// The requested conversation is not in the list
    #[error("Conversation not found: {0}")]
    UnknownCounterpart(String),
}

/// Error types for portal messaging operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Local validation error (never reaches the network)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Network failure, timeout or non-2xx response
    #[error("Transport error: {detail}")]
    Transport {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Human-readable message from the server's error payload
        server_message: Option<String>,
        /// Diagnostic description of the failure
        detail: String,
    },

    /// The server rejected the bearer credential (HTTP 401)
    #[error("Session expired")]
    AuthExpired,

    /// A response arrived after its request stopped being relevant
    #[error("Stale response discarded: {0}")]
    StaleResponse(String),

    /// Invalid or unreadable settings
    #[error("Settings error: {0}")]
    Settings(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a transport error without a server payload
    pub fn transport(detail: impl Into<String>) -> Self {
        Error::Transport {
            status: None,
            server_message: None,
            detail: detail.into(),
        }
    }

    /// Text suitable for showing next to the message form
    ///
    /// Prefers the server-supplied message, then the validation text, and
    /// falls back to `fallback` for everything else.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Validation(e) => e.to_string(),
            Error::Transport {
                server_message: Some(msg),
                ..
            } if !msg.trim().is_empty() => msg.clone(),
            Error::AuthExpired => "Your session has expired. Please log in again.".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Whether this error is an internally detected stale response
    pub fn is_stale(&self) -> bool {
        matches!(self, Error::StaleResponse(_))
    }
}

/// Initialize the library with logging
pub fn init() {
    tracing_subscriber::fmt::init();
}

#[cfg(test)]
mod tests;
