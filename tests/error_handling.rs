//! Error handling and edge case tests.

use observable_store::{
    BeforeSetEvent, FeedAdapter, Pokemon, RecordStore, StoreError, Unsubscribe,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use tempfile::TempDir;

#[derive(Debug)]
struct Rejected(String);

impl std::fmt::Display for Rejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rejected {}", self.0)
    }
}

impl std::error::Error for Rejected {}

// --- Record Errors ---

#[test]
fn test_get_missing_is_none() {
    let store = RecordStore::<Pokemon>::new();

    // Should return None, not error
    assert!(store.get("missingno").is_none());
}

#[test]
fn test_empty_id_is_invalid() {
    let store = RecordStore::<Pokemon>::new();

    let result = store.set(Pokemon::new("", 10, 10));
    assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
    assert!(store.is_empty());
}

#[test]
fn test_json_record_without_id_is_invalid() {
    let store = RecordStore::<Value>::new();

    let result = store.set(json!({"name": "missingno"}));
    assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
}

// --- Listener Errors ---

#[test]
fn test_before_listener_vetoes_write() {
    let store = RecordStore::<Pokemon>::new();
    store.on_before_add(|event: &BeforeSetEvent<Pokemon>| {
        if event.incoming.attack > 100 {
            return Err(Box::new(Rejected(event.incoming.id.clone())));
        }
        Ok(())
    });

    store.set(Pokemon::new("pikachu", 55, 40)).unwrap();
    let err = store.set(Pokemon::new("mewtwo", 110, 90)).unwrap_err();

    match err {
        StoreError::Listener { channel, source } => {
            assert_eq!(channel, "before_add");
            assert_eq!(source.to_string(), "rejected mewtwo");
        }
        other => panic!("Expected Listener error, got {:?}", other),
    }
    assert!(store.get("mewtwo").is_none());
    assert!(store.get("pikachu").is_some());
}

#[test]
fn test_before_listener_veto_keeps_previous_value() {
    let store = RecordStore::<Pokemon>::new();
    store.set(Pokemon::new("pikachu", 55, 40)).unwrap();

    store.on_before_add(|event| {
        if event.previous.is_some() {
            return Err("no overwrites".into());
        }
        Ok(())
    });

    assert!(store.set(Pokemon::new("pikachu", 99, 99)).is_err());
    assert_eq!(store.get("pikachu").unwrap().attack, 55);
}

#[test]
fn test_after_listener_failure_does_not_undo() {
    let store = RecordStore::<Pokemon>::new();
    let later = Arc::new(Mutex::new(0));

    store.on_after_add(|_| Err("audit log unavailable".into()));
    let later_in = Arc::clone(&later);
    store.on_after_add(move |_| {
        *later_in.lock() += 1;
        Ok(())
    });

    let err = store.set(Pokemon::new("pikachu", 55, 40)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Listener {
            channel: "after_add",
            ..
        }
    ));

    // Write stands, remaining listeners skipped.
    assert_eq!(store.get("pikachu").unwrap().defense, 40);
    assert_eq!(*later.lock(), 0);
}

#[test]
fn test_listener_unsubscribes_itself() {
    let store = RecordStore::<Pokemon>::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let token: Arc<OnceLock<Unsubscribe>> = Arc::new(OnceLock::new());

    let (seen_in, token_in) = (Arc::clone(&seen), Arc::clone(&token));
    let unsubscribe = store.on_after_add(move |event| {
        seen_in.lock().push(event.value.id.clone());
        if let Some(token) = token_in.get() {
            token.unsubscribe();
        }
        Ok(())
    });
    token.set(unsubscribe).unwrap();

    store.set(Pokemon::new("bulbasaur", 50, 10)).unwrap();
    store.set(Pokemon::new("squirtle", 40, 30)).unwrap();

    assert_eq!(*seen.lock(), vec!["bulbasaur"]);
    assert_eq!(store.listener_counts(), (0, 0));
}

#[test]
fn test_listener_subscribes_during_dispatch() {
    let store = Arc::new(RecordStore::<Pokemon>::new());
    let late_calls = Arc::new(Mutex::new(0));

    let (weak, late) = (Arc::downgrade(&store), Arc::clone(&late_calls));
    store.on_after_add(move |_| {
        if let Some(store) = weak.upgrade() {
            let late = Arc::clone(&late);
            store.on_after_add(move |_| {
                *late.lock() += 1;
                Ok(())
            });
        }
        Ok(())
    });

    // The listener added during the first dispatch only sees later writes.
    store.set(Pokemon::new("a", 1, 1)).unwrap();
    assert_eq!(*late_calls.lock(), 0);
    store.set(Pokemon::new("b", 1, 1)).unwrap();
    assert_eq!(*late_calls.lock(), 1);
}

// --- Feed Errors ---

#[test]
fn test_feed_missing_file() {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::<Pokemon>::new();

    let result = FeedAdapter::new(&store).load_path(dir.path().join("nope.json"));
    assert!(matches!(result, Err(StoreError::Io(_))));
}

#[test]
fn test_feed_stops_at_listener_failure() {
    let store = RecordStore::<Pokemon>::new();
    store.on_before_add(|event| {
        if event.incoming.id == "ditto" {
            return Err("duplicate shape".into());
        }
        Ok(())
    });

    let data = r#"[
        {"id": "mew", "attack": 100, "defense": 100},
        {"id": "ditto", "attack": 48, "defense": 48},
        {"id": "eevee", "attack": 55, "defense": 50}
    ]"#;
    let result = FeedAdapter::new(&store).load_json(data.as_bytes());

    assert!(matches!(result, Err(StoreError::Listener { .. })));
    assert_eq!(store.ids(), vec!["mew"]);
}
