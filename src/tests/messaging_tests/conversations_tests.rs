use super::conversation;
use crate::messaging::conversations::*;
use crate::Error;

#[test]
fn test_new_store_is_empty() {
    let store = ConversationStore::new();
    assert!(store.is_empty());
    assert!(!store.is_loaded());
    assert!(!store.is_refreshing());
    assert_eq!(store.total_unread(), 0);
    assert!(store.error().is_none());
}

#[test]
fn test_refresh_applies_and_sorts() {
    let mut store = ConversationStore::new();
    let ticket = store.begin_refresh();
    assert!(store.is_refreshing());

    let applied = store
        .complete_refresh(
            ticket,
            Ok(vec![
                conversation("a", Some(5), 0),
                conversation("b", Some(30), 2),
                conversation("c", None, 0),
                conversation("d", Some(10), 1),
            ]),
        )
        .expect("Failed to apply refresh");

    assert_eq!(applied, 4);
    let order: Vec<&str> = store.conversations().iter().map(|c| c.counterpart_id()).collect();
    assert_eq!(order, vec!["b", "d", "a", "c"]);
    assert_eq!(store.total_unread(), 3);
    assert!(store.is_loaded());
    assert!(!store.is_refreshing());
}

#[test]
fn test_normalize_deduplicates_first_wins() {
    let mut first = conversation("a", Some(5), 1);
    first.message_count = 7;
    let normalized = normalize(vec![first, conversation("a", Some(20), 0), conversation("b", Some(1), 0)]);

    assert_eq!(normalized.len(), 2);
    let a = normalized.iter().find(|c| c.counterpart_id() == "a").unwrap();
    assert_eq!(a.message_count, 7);
}

#[test]
fn test_normalize_ties_keep_server_order() {
    let normalized = normalize(vec![
        conversation("x", Some(3), 0),
        conversation("y", Some(3), 0),
        conversation("z", Some(3), 0),
    ]);
    let order: Vec<&str> = normalized.iter().map(|c| c.counterpart_id()).collect();
    assert_eq!(order, vec!["x", "y", "z"]);
}

#[test]
fn test_refresh_is_idempotent() {
    let mut store = ConversationStore::new();
    let data = vec![conversation("a", Some(5), 1), conversation("b", Some(9), 0)];

    let t1 = store.begin_refresh();
    store.complete_refresh(t1, Ok(data.clone())).unwrap();
    let first = store.conversations().to_vec();

    let t2 = store.begin_refresh();
    store.complete_refresh(t2, Ok(data)).unwrap();

    assert_eq!(store.conversations(), first.as_slice());
}

#[test]
fn test_older_response_never_overwrites_newer() {
    let mut store = ConversationStore::new();
    let older = store.begin_refresh();
    let newer = store.begin_refresh();

    store
        .complete_refresh(newer, Ok(vec![conversation("new", Some(50), 0)]))
        .expect("Failed to apply newer refresh");

    let err = store
        .complete_refresh(older, Ok(vec![conversation("old", Some(1), 0)]))
        .unwrap_err();

    assert!(err.is_stale());
    assert_eq!(store.len(), 1);
    assert!(store.get("new").is_some());
    assert!(store.get("old").is_none());
    assert!(!store.is_refreshing());
}

#[test]
fn test_newer_response_applies_after_older() {
    let mut store = ConversationStore::new();
    let older = store.begin_refresh();
    let newer = store.begin_refresh();

    store.complete_refresh(older, Ok(vec![conversation("old", Some(1), 0)])).unwrap();
    store.complete_refresh(newer, Ok(vec![conversation("new", Some(2), 0)])).unwrap();

    assert!(store.get("new").is_some());
    assert!(store.get("old").is_none());
}

#[test]
fn test_failure_keeps_list_and_sets_error() {
    let mut store = ConversationStore::new();
    let t1 = store.begin_refresh();
    store.complete_refresh(t1, Ok(vec![conversation("a", Some(5), 0)])).unwrap();

    let t2 = store.begin_refresh();
    let err = store
        .complete_refresh(t2, Err(Error::transport("fetch conversations timed out")))
        .unwrap_err();

    assert!(matches!(err, Error::Transport { .. }));
    assert_eq!(store.len(), 1);
    assert_eq!(store.error(), Some("Failed to load conversations"));

    let t3 = store.begin_refresh();
    store.complete_refresh(t3, Ok(vec![conversation("a", Some(5), 0)])).unwrap();
    assert!(store.error().is_none());
}

#[test]
fn test_failure_uses_server_message() {
    let mut store = ConversationStore::new();
    let ticket = store.begin_refresh();
    let outcome = Err(Error::Transport {
        status: Some(500),
        server_message: Some("Database unavailable".to_string()),
        detail: "fetch conversations failed with status 500".to_string(),
    });

    assert!(store.complete_refresh(ticket, outcome).is_err());
    assert_eq!(store.error(), Some("Database unavailable"));
    assert!(!store.is_loaded());
}

#[test]
fn test_stale_failure_is_ignored() {
    let mut store = ConversationStore::new();
    let older = store.begin_refresh();
    let newer = store.begin_refresh();

    store.complete_refresh(newer, Ok(vec![conversation("a", Some(5), 0)])).unwrap();
    let err = store
        .complete_refresh(older, Err(Error::transport("late failure")))
        .unwrap_err();

    assert!(err.is_stale());
    assert!(store.error().is_none());
}

#[test]
fn test_ticket_sequence_is_monotonic() {
    let mut store = ConversationStore::new();
    let a = store.begin_refresh();
    let b = store.begin_refresh();
    assert!(b > a);
    assert_eq!(b.seq(), a.seq() + 1);
}
