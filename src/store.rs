//! The observable in-memory record store.

use crate::error::{ListenerError, Result, StoreError};
use crate::observer::{EventChannel, Unsubscribe};
use crate::traversal::{best_of, RecordVisitor, ScoreStrategy};
use crate::types::{AfterSetEvent, BeforeSetEvent, Record};
use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Name used in log events and error messages.
    pub name: String,

    /// Number of records to reserve space for up front.
    pub initial_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "records".to_string(),
            initial_capacity: 0,
        }
    }
}

impl StoreConfig {
    /// Default config with a custom name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}

/// Records in first-insertion order, indexed by id.
struct RecordMap<T> {
    positions: HashMap<String, usize>,
    entries: Vec<T>,
}

impl<T: Record> RecordMap<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
        }
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.positions.get(id).map(|&pos| &self.entries[pos])
    }

    /// Insert or replace. A replaced record keeps its slot.
    fn insert(&mut self, record: T) {
        match self.positions.get(record.id()) {
            Some(&pos) => self.entries[pos] = record,
            None => {
                self.positions
                    .insert(record.id().to_string(), self.entries.len());
                self.entries.push(record);
            }
        }
    }
}

/// In-memory store of records keyed by id, with change notification.
///
/// Every [`RecordStore::set`] runs, on the calling thread:
/// 1. all before-add listeners, in subscription order
/// 2. the write
/// 3. all after-add listeners, in subscription order
///
/// No lock is held while listeners, visitors or scoring functions run, so
/// they may read from or write to the same store. Nested writes interleave
/// their notifications in call order.
pub struct RecordStore<T: Record> {
    config: StoreConfig,
    records: RwLock<RecordMap<T>>,
    before_add: EventChannel<BeforeSetEvent<T>>,
    after_add: EventChannel<AfterSetEvent<T>>,
}

impl<T: Record> RecordStore<T> {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store.
    pub fn with_config(config: StoreConfig) -> Self {
        let records = RecordMap::with_capacity(config.initial_capacity);
        Self {
            config,
            records: RwLock::new(records),
            before_add: EventChannel::with_label("before_add"),
            after_add: EventChannel::with_label("after_add"),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- Record Operations ---

    /// Get a record by id.
    pub fn get(&self, id: &str) -> Option<T> {
        self.records.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.read().positions.contains_key(id)
    }

    /// Insert a record, replacing any record with the same id.
    ///
    /// Fails with [`StoreError::InvalidRecord`] for an empty id, before any
    /// listener runs. A failing before-add listener aborts the write; a
    /// failing after-add listener is reported but the write stands.
    pub fn set(&self, record: T) -> Result<()> {
        if record.id().is_empty() {
            return Err(StoreError::InvalidRecord(format!(
                "{}: record id must not be empty",
                self.config.name
            )));
        }

        let previous = self.get(record.id());
        debug!(
            store = %self.config.name,
            id = record.id(),
            replace = previous.is_some(),
            "set record"
        );

        self.before_add.publish(&BeforeSetEvent {
            previous,
            incoming: record.clone(),
        })?;

        self.records.write().insert(record.clone());

        self.after_add.publish(&AfterSetEvent { value: record })
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids in iteration order.
    pub fn ids(&self) -> Vec<String> {
        self.records
            .read()
            .entries
            .iter()
            .map(|r| r.id().to_string())
            .collect()
    }

    /// Copy of all records in iteration order.
    pub fn snapshot(&self) -> Vec<T> {
        self.records.read().entries.clone()
    }

    // --- Listeners ---

    /// Run `listener` before every write.
    pub fn on_before_add<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&BeforeSetEvent<T>) -> std::result::Result<(), ListenerError>
            + Send
            + Sync
            + 'static,
    {
        self.before_add.subscribe(listener)
    }

    /// Run `listener` after every write.
    pub fn on_after_add<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&AfterSetEvent<T>) -> std::result::Result<(), ListenerError>
            + Send
            + Sync
            + 'static,
    {
        self.after_add.subscribe(listener)
    }

    /// Receive committed writes on a bounded channel.
    ///
    /// A receiver that falls `capacity` events behind is dropped.
    pub fn watch(&self, capacity: usize) -> (Receiver<AfterSetEvent<T>>, Unsubscribe) {
        self.after_add.subscribe_channel(capacity)
    }

    /// Listener counts as `(before_add, after_add)`.
    pub fn listener_counts(&self) -> (usize, usize) {
        (
            self.before_add.listener_count(),
            self.after_add.listener_count(),
        )
    }

    // --- Traversal ---

    /// Call `visitor` once per record, in iteration order.
    pub fn visit<V>(&self, mut visitor: V)
    where
        V: RecordVisitor<T>,
    {
        for record in self.snapshot().iter() {
            visitor.visit(record);
        }
    }

    /// Like [`RecordStore::visit`] but stops at the first error.
    pub fn try_visit<F, E>(&self, mut visitor: F) -> std::result::Result<(), E>
    where
        F: FnMut(&T) -> std::result::Result<(), E>,
    {
        for record in self.snapshot().iter() {
            visitor(record)?;
        }
        Ok(())
    }

    // --- Selection ---

    /// The record with the strictly highest score, or None if empty.
    ///
    /// Ties go to the record that comes first in iteration order.
    pub fn select_best<F>(&self, score: F) -> Option<T>
    where
        F: Fn(&T) -> f64,
    {
        self.select_best_by(&score)
    }

    /// [`RecordStore::select_best`] with a named strategy.
    pub fn select_best_by<S>(&self, strategy: &S) -> Option<T>
    where
        S: ScoreStrategy<T> + ?Sized,
    {
        let records = self.snapshot();
        best_of(records.iter(), strategy).cloned()
    }
}

impl<T: Record> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> fmt::Debug for RecordStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("name", &self.config.name)
            .field("records", &self.len())
            .field("before_add", &self.before_add)
            .field("after_add", &self.after_add)
            .finish()
    }
}
