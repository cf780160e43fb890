//! Conversation messaging
//!
//! This module turns the flat message store into a near-real-time
//! conversation view:
//! - `contacts` - Role-dependent contact directory
//! - `conversations` - Conversation summary store with tagged refreshes
//! - `history` - Per-counterpart history loading with stale discard
//! - `composer` - Validation and single-flight sending
//! - `poller` - Cancellable periodic refresh
//! - `view` - The coordinator tying selection, loading and errors together

pub mod composer;
pub mod contacts;
pub mod conversations;
pub mod history;
pub mod poller;
pub mod view;

pub use composer::{Composer, send_message};
pub use contacts::{ContactDirectory, ContactListing};
pub use conversations::{ConversationStore, RefreshTicket};
pub use history::{HistoryLoader, HistoryStatus, HistoryTicket};
pub use poller::Poller;
pub use view::{ListState, MessagingView, ViewPhase, ViewSnapshot};
