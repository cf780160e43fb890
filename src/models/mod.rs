//! Portal data model
//!
//! The module is organized into submodules:
//! - `user` - Users, roles and the identity references embedded in messages
//! - `message` - Immutable messages as stored by the backend
//! - `conversation` - Per-counterpart conversation summaries and selection

pub mod conversation;
pub mod message;
pub mod user;

pub use conversation::{Conversation, Selection};
pub use message::{AppointmentRef, Message, SendMessageRequest};
pub use user::{Participant, Role, User, UserRef};
