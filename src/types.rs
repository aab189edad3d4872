//! Core types for the record store.

use serde::{Deserialize, Serialize};

/// A value the store can hold.
///
/// Records are keyed by [`Record::id`], which must be non-empty and must not
/// change for the lifetime of the value. Everything else about the record is
/// opaque to the store.
pub trait Record: Clone + Send + Sync + 'static {
    /// Unique identifier of this record within a store.
    fn id(&self) -> &str;
}

/// Untyped records: a JSON object keyed by its `"id"` string field.
///
/// Objects without a string `id` report an empty id and are rejected by
/// [`RecordStore::set`](crate::RecordStore::set).
impl Record for serde_json::Value {
    fn id(&self) -> &str {
        self.get("id").and_then(|v| v.as_str()).unwrap_or("")
    }
}

/// Emitted immediately before a record is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeforeSetEvent<T> {
    /// Value currently stored under the id (None if the id is new).
    pub previous: Option<T>,
    /// Value about to be stored.
    pub incoming: T,
}

impl<T: Record> BeforeSetEvent<T> {
    /// True if this write introduces a new id.
    pub fn is_insert(&self) -> bool {
        self.previous.is_none()
    }

    pub fn id(&self) -> &str {
        self.incoming.id()
    }
}

/// Emitted immediately after a record is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AfterSetEvent<T> {
    /// The committed value.
    pub value: T,
}

impl<T: Record> AfterSetEvent<T> {
    pub fn id(&self) -> &str {
        self.value.id()
    }
}
