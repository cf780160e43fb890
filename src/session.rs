//! Authenticated session
//!
//! A session is created by the authentication layer on login and dropped on
//! logout. The messaging core only reads it: every component that issues
//! requests receives the session (or an [`ApiClient`](crate::ApiClient)
//! built from it) explicitly.

use crate::models::{Role, User};
use crate::{Error, Result};
use std::fmt;

/// Current user identity, role and bearer credential
#[derive(Clone, PartialEq)]
pub struct Session {
    /// The logged-in user
    pub user: User,
    /// Bearer token attached to every request
    token: String,
}

impl Session {
    /// Create a session for a logged-in user
    pub fn new(user: User, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Settings("Session token is empty".to_string()));
        }
        if user.id.trim().is_empty() {
            return Err(Error::Settings("Session user id is empty".to_string()));
        }
        Ok(Self { user, token })
    }

    /// Current user identifier
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Current user role
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Bearer token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Subject line used for messages sent in this session
    pub fn message_subject(&self) -> String {
        self.user.role.default_subject()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}
