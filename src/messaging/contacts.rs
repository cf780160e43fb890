//! Contact directory
//!
//! Resolves the people the current user may start a conversation with.
//! Students and teachers see approved teachers; admins see every student
//! and teacher. The directory may be stale or empty without blocking the
//! rest of the view.

use crate::models::{Role, User};
use crate::session::Session;
use crate::transport::ApiClient;
use crate::Result;
use tracing::{info, warn};

/// Result of a directory lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactListing {
    /// Addressable contacts, in server order
    pub contacts: Vec<User>,
    /// Non-fatal warning when the lookup failed
    pub warning: Option<String>,
}

/// Role-dependent contact directory
#[derive(Clone)]
pub struct ContactDirectory {
    api: ApiClient,
    admin_limit: u32,
}

impl ContactDirectory {
    /// Create a directory backed by `api`
    ///
    /// `admin_limit` is the page size requested from the admin user list.
    pub fn new(api: ApiClient, admin_limit: u32) -> Self {
        Self { api, admin_limit }
    }

    /// List contacts for the session's user, degrading to empty on failure
    pub async fn list_contacts(&self, session: &Session) -> ContactListing {
        match self.fetch_contacts(session.role(), session.user_id()).await {
            Ok(contacts) => {
                info!("Loaded {} contacts for {} {}", contacts.len(), session.role(), session.user_id());
                ContactListing {
                    contacts,
                    warning: None,
                }
            }
            Err(e) => {
                warn!("Failed to load contacts: {}", e);
                ContactListing {
                    contacts: Vec::new(),
                    warning: Some(e.user_message("Failed to load contacts")),
                }
            }
        }
    }

    /// Fetch contacts for `role`, excluding `self_id`
    pub async fn fetch_contacts(&self, role: Role, self_id: &str) -> Result<Vec<User>> {
        let users = match role {
            Role::Admin => self.api.list_all_users(self.admin_limit).await?,
            Role::Student | Role::Teacher => self.api.list_teachers().await?,
        };
        Ok(filter_contacts(role, self_id, users))
    }
}

/// Apply the role policy to a raw user list
pub fn filter_contacts(role: Role, self_id: &str, users: Vec<User>) -> Vec<User> {
    users
        .into_iter()
        .filter(|u| u.id != self_id && !u.id.is_empty())
        .filter(|u| match role {
            Role::Admin => u.role != Role::Admin,
            Role::Student | Role::Teacher => !u.is_rejected(),
        })
        .collect()
}
