use super::message_at;
use crate::messaging::history::*;
use crate::Error;

#[test]
fn test_new_loader_is_idle() {
    let loader = HistoryLoader::new();
    assert_eq!(loader.status(), &HistoryStatus::Idle);
    assert!(loader.counterpart_id().is_none());
    assert!(loader.messages().is_empty());
}

#[test]
fn test_select_then_complete_sorts_ascending() {
    let mut loader = HistoryLoader::new();
    let ticket = loader.select(Some("t1"), false).expect("missing ticket");
    assert_eq!(loader.status(), &HistoryStatus::Loading);
    assert_eq!(ticket.counterpart_id(), "t1");

    let shown = loader
        .complete(
            &ticket,
            Ok(vec![
                message_at("m3", "t1", "s1", "third", 30),
                message_at("m1", "s1", "t1", "first", 10),
                message_at("m2", "t1", "s1", "second", 20),
            ]),
        )
        .expect("Failed to apply history");

    assert_eq!(shown, 3);
    assert_eq!(loader.status(), &HistoryStatus::Ready);
    let contents: Vec<&str> = loader.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
}

#[test]
fn test_switch_discards_previous_response() {
    let mut loader = HistoryLoader::new();
    let for_a = loader.select(Some("a"), false).unwrap();
    let for_b = loader.select(Some("b"), false).unwrap();

    loader
        .complete(&for_b, Ok(vec![message_at("b1", "b", "s1", "from b", 5)]))
        .unwrap();
    let err = loader
        .complete(&for_a, Ok(vec![message_at("a1", "a", "s1", "from a", 9)]))
        .unwrap_err();

    assert!(err.is_stale());
    assert_eq!(loader.counterpart_id(), Some("b"));
    assert_eq!(loader.messages().len(), 1);
    assert_eq!(loader.messages()[0].content, "from b");
}

#[test]
fn test_late_response_for_previous_selection_after_reselect() {
    let mut loader = HistoryLoader::new();
    let first = loader.select(Some("a"), false).unwrap();
    loader.select(Some("b"), false).unwrap();
    let again = loader.select(Some("a"), false).unwrap();

    assert!(!loader.is_current(&first));
    assert!(loader.is_current(&again));
    assert!(loader.complete(&first, Ok(vec![])).unwrap_err().is_stale());
    assert_eq!(loader.status(), &HistoryStatus::Loading);
}

#[test]
fn test_deselect_goes_idle_and_discards() {
    let mut loader = HistoryLoader::new();
    let ticket = loader.select(Some("a"), false).unwrap();
    assert!(loader.select(None, false).is_none());

    assert_eq!(loader.status(), &HistoryStatus::Idle);
    assert!(loader.complete(&ticket, Ok(vec![message_at("a1", "a", "s1", "x", 1)])).is_err());
    assert!(loader.messages().is_empty());
}

#[test]
fn test_known_empty_is_ready_immediately() {
    let mut loader = HistoryLoader::new();
    let ticket = loader.select(Some("new-contact"), true);

    assert!(ticket.is_some());
    assert_eq!(loader.status(), &HistoryStatus::Ready);
    assert!(loader.messages().is_empty());
}

#[test]
fn test_failure_empties_pane() {
    let mut loader = HistoryLoader::new();
    let ticket = loader.select(Some("a"), false).unwrap();
    loader.complete(&ticket, Ok(vec![message_at("a1", "a", "s1", "x", 1)])).unwrap();

    let reload = loader.reload().unwrap();
    let err = loader
        .complete(&reload, Err(Error::transport("could not reach the server")))
        .unwrap_err();

    assert!(!err.is_stale());
    assert!(loader.messages().is_empty());
    assert_eq!(loader.status(), &HistoryStatus::Failed("Failed to load messages".to_string()));
}

#[test]
fn test_reload_keeps_messages_while_loading() {
    let mut loader = HistoryLoader::new();
    let ticket = loader.select(Some("a"), false).unwrap();
    loader.complete(&ticket, Ok(vec![message_at("a1", "a", "s1", "x", 1)])).unwrap();

    let reload = loader.reload().expect("missing ticket");
    assert_eq!(reload.generation(), ticket.generation() + 1);
    assert_eq!(loader.messages().len(), 1);
    assert_eq!(loader.status(), &HistoryStatus::Ready);
    assert!(!loader.is_current(&ticket));
}

#[test]
fn test_reload_after_failure_shows_loading() {
    let mut loader = HistoryLoader::new();
    let ticket = loader.select(Some("a"), false).unwrap();
    let _ = loader.complete(&ticket, Err(Error::transport("down")));

    loader.reload().unwrap();
    assert_eq!(loader.status(), &HistoryStatus::Loading);
}

#[test]
fn test_reload_without_selection() {
    let mut loader = HistoryLoader::new();
    assert!(loader.reload().is_none());
}
