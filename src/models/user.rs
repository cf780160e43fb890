//! Users, roles and identity references

use serde::{Deserialize, Serialize};
use std::fmt;

/// Portal role of a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Student: books appointments and messages teachers
    #[default]
    Student,
    /// Teacher: approves appointments, reachable by students
    Teacher,
    /// Administrator: can reach any student or teacher
    Admin,
}

impl Role {
    /// Display label ("Student", "Teacher", "Admin")
    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Admin => "Admin",
        }
    }

    /// Default subject line attached to messages sent by this role
    pub fn default_subject(&self) -> String {
        format!("Message from {}", self.label())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A portal user, as returned by the directory endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Portal role (absent on `/api/teachers` records)
    #[serde(default)]
    pub role: Role,
    /// Approval flag, when the backend reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl User {
    /// Create a new user record
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            approved: None,
        }
    }

    /// Whether the backend explicitly marked this user as not approved
    pub fn is_rejected(&self) -> bool {
        self.approved == Some(false)
    }

    /// First letter of the name, uppercased, or `?`
    pub fn initial(&self) -> char {
        initial_of(&self.name)
    }
}

/// Counterpart identity embedded in conversation summaries (`otherUser`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Backend identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
}

impl Participant {
    /// First letter of the name, uppercased, or `?`
    pub fn initial(&self) -> char {
        initial_of(&self.name)
    }
}

impl From<&User> for Participant {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Sender/receiver reference on a message
///
/// The backend returns either a bare id or a populated user document
/// depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    /// Bare identifier
    Id(String),
    /// Populated user document
    Populated(Participant),
}

impl UserRef {
    /// Identifier of the referenced user
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::Populated(p) => &p.id,
        }
    }

    /// Display name, when the reference is populated
    pub fn name(&self) -> Option<&str> {
        match self {
            UserRef::Id(_) => None,
            UserRef::Populated(p) => Some(&p.name),
        }
    }
}

impl From<&str> for UserRef {
    fn from(id: &str) -> Self {
        UserRef::Id(id.to_string())
    }
}

fn initial_of(name: &str) -> char {
    name.chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('?')
}
