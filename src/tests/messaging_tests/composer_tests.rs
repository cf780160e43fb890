use super::super::mock_backend::*;
use super::super::*;
use super::message_at;
use crate::messaging::composer::*;
use crate::{Error, ValidationError};
use hyper::Method;

#[test]
fn test_validate_returns_trimmed_text() {
    let content = validate_message("  Hi there \n", Some("t1"), "s1", 2000).expect("Failed to validate");
    assert_eq!(content, "Hi there");
}

#[test]
fn test_validate_empty() {
    assert_eq!(
        validate_message("   \n\t", Some("t1"), "s1", 2000),
        Err(ValidationError::EmptyMessage)
    );
}

#[test]
fn test_validate_no_selection() {
    assert_eq!(
        validate_message("Hi", None, "s1", 2000),
        Err(ValidationError::NoConversationSelected)
    );
    assert_eq!(
        validate_message("Hi", Some(""), "s1", 2000),
        Err(ValidationError::NoConversationSelected)
    );
}

#[test]
fn test_validate_empty_takes_precedence() {
    assert_eq!(validate_message("", None, "s1", 2000), Err(ValidationError::EmptyMessage));
}

#[test]
fn test_validate_self_addressed() {
    assert_eq!(
        validate_message("Hi", Some("s1"), "s1", 2000),
        Err(ValidationError::SelfAddressed)
    );
}

#[test]
fn test_validate_length_counts_characters() {
    let exact = "é".repeat(10);
    assert!(validate_message(&exact, Some("t1"), "s1", 10).is_ok());

    let over = "é".repeat(11);
    assert_eq!(
        validate_message(&over, Some("t1"), "s1", 10),
        Err(ValidationError::MessageTooLong { max: 10 })
    );
}

#[test]
fn test_composer_single_flight() {
    let mut composer = Composer::new();
    composer.set_draft("Hi");
    assert!(composer.can_submit());

    let content = composer.begin_send(Some("t1"), "s1", 2000).expect("Failed to begin");
    assert_eq!(content, "Hi");
    assert!(composer.is_sending());
    assert!(!composer.can_submit());

    assert_eq!(
        composer.begin_send(Some("t1"), "s1", 2000),
        Err(ValidationError::SendInProgress)
    );
}

#[test]
fn test_composer_validation_error_inline() {
    let mut composer = Composer::new();
    composer.set_draft("   ");

    assert_eq!(composer.begin_send(Some("t1"), "s1", 2000), Err(ValidationError::EmptyMessage));
    assert_eq!(composer.error(), Some("Please type a message"));
    assert!(!composer.is_sending());
}

#[test]
fn test_composer_success_clears_draft() {
    let mut composer = Composer::new();
    composer.set_draft("Hi");
    composer.begin_send(Some("t1"), "s1", 2000).unwrap();

    composer.finish_send(&Ok(message_at("m1", "s1", "t1", "Hi", 1)), true);

    assert_eq!(composer.draft(), "");
    assert!(composer.error().is_none());
    assert!(!composer.is_sending());
}

#[test]
fn test_composer_success_after_switch_keeps_draft() {
    let mut composer = Composer::new();
    composer.set_draft("Hi");
    composer.begin_send(Some("t1"), "s1", 2000).unwrap();
    composer.set_draft("typed for someone else");

    composer.finish_send(&Ok(message_at("m1", "s1", "t1", "Hi", 1)), false);

    assert_eq!(composer.draft(), "typed for someone else");
    assert!(!composer.is_sending());
}

#[test]
fn test_composer_failure_keeps_draft() {
    let mut composer = Composer::new();
    composer.set_draft("Hi");
    composer.begin_send(Some("t1"), "s1", 2000).unwrap();

    composer.finish_send(&Err(Error::transport("could not reach the server")), true);

    assert_eq!(composer.draft(), "Hi");
    assert_eq!(composer.error(), Some(SEND_FAILED_FALLBACK));
    assert!(!composer.is_sending());
}

#[test]
fn test_composer_clear() {
    let mut composer = Composer::new();
    composer.set_draft("   ");
    let _ = composer.begin_send(Some("t1"), "s1", 2000);
    composer.clear();

    assert_eq!(composer.draft(), "");
    assert!(composer.error().is_none());
}

#[tokio::test]
async fn test_send_message_posts_trimmed_content() {
    let backend = portal().await;
    let session = session_for(student(), STUDENT_TOKEN);
    let api = client_for(&backend, &session);

    let message = send_message(&api, &session, ALICE_ID, "  Hi  ", 2000)
        .await
        .expect("Failed to send");

    assert_eq!(message.content, "Hi");
    let stored = backend.messages().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content, "Hi");
    assert_eq!(stored[0].subject, "Message from Student");
}

#[tokio::test]
async fn test_send_message_teacher_subject() {
    let backend = portal().await;
    let session = session_for(alice(), ALICE_TOKEN);
    let api = client_for(&backend, &session);

    send_message(&api, &session, STUDENT_ID, "Hello", 2000)
        .await
        .expect("Failed to send");

    assert_eq!(backend.messages().await[0].subject, "Message from Teacher");
}

#[tokio::test]
async fn test_send_message_validation_never_hits_network() {
    let backend = portal().await;
    let session = session_for(student(), STUDENT_TOKEN);
    let api = client_for(&backend, &session);

    let cases = [
        ("   ", ALICE_ID, 2000),
        ("Hi", STUDENT_ID, 2000),
        ("too long", ALICE_ID, 3),
    ];
    for (text, to, max) in cases {
        let err = send_message(&api, &session, to, text, max).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "unexpected {:?}", err);
    }

    assert_eq!(backend.request_count(Method::POST, "/api/messages/send").await, 0);
}

#[tokio::test]
async fn test_send_message_server_rejection() {
    let backend = portal().await;
    backend.fail(ROUTE_SEND, 400, "Receiver is not accepting messages").await;
    let session = session_for(student(), STUDENT_TOKEN);
    let api = client_for(&backend, &session);

    let err = send_message(&api, &session, ALICE_ID, "Hi", 2000).await.unwrap_err();
    assert_eq!(err.user_message(SEND_FAILED_FALLBACK), "Receiver is not accepting messages");
}
