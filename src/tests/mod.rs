// Test modules for Portal Messaging
// Shared fixtures live here; the mock backend serves the portal REST API

mod messaging_tests;

use crate::models::{Role, User};
use crate::session::Session;
use crate::transport::ApiClient;
use mock_backend::MockBackend;

pub(crate) const STUDENT_ID: &str = "s1";
pub(crate) const STUDENT_TOKEN: &str = "tok-s1";
pub(crate) const OTHER_STUDENT_ID: &str = "s2";
pub(crate) const ALICE_ID: &str = "t1";
pub(crate) const ALICE_TOKEN: &str = "tok-t1";
pub(crate) const BOB_ID: &str = "t2";
pub(crate) const CAROL_ID: &str = "t3";
pub(crate) const ADMIN_ID: &str = "a1";
pub(crate) const ADMIN_TOKEN: &str = "tok-a1";

pub(crate) fn student() -> User {
    User::new(STUDENT_ID, "Sam Student", "sam@school.test", Role::Student)
}

pub(crate) fn other_student() -> User {
    User::new(OTHER_STUDENT_ID, "Sue Student", "sue@school.test", Role::Student)
}

pub(crate) fn alice() -> User {
    let mut user = User::new(ALICE_ID, "Alice Teacher", "alice@school.test", Role::Teacher);
    user.approved = Some(true);
    user
}

pub(crate) fn bob() -> User {
    User::new(BOB_ID, "Bob Teacher", "bob@school.test", Role::Teacher)
}

/// A teacher whose registration was rejected
pub(crate) fn carol() -> User {
    let mut user = User::new(CAROL_ID, "Carol Teacher", "carol@school.test", Role::Teacher);
    user.approved = Some(false);
    user
}

pub(crate) fn admin() -> User {
    User::new(ADMIN_ID, "Ada Admin", "ada@school.test", Role::Admin)
}

/// Backend populated with the standard cast
pub(crate) async fn portal() -> MockBackend {
    let backend = MockBackend::start().await;
    backend.add_user(student(), STUDENT_TOKEN).await;
    backend.add_user(other_student(), "tok-s2").await;
    backend.add_user(alice(), ALICE_TOKEN).await;
    backend.add_user(bob(), "tok-t2").await;
    backend.add_user(carol(), "tok-t3").await;
    backend.add_user(admin(), ADMIN_TOKEN).await;
    backend
}

pub(crate) fn session_for(user: User, token: &str) -> Session {
    Session::new(user, token).expect("Failed to create session")
}

pub(crate) fn client_for(backend: &MockBackend, session: &Session) -> ApiClient {
    ApiClient::for_session(&backend.settings(), session).expect("Failed to create client")
}
