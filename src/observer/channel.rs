//! Event channel for broadcasting events to registered listeners.

use crate::error::{ListenerError, Result, StoreError};
use crossbeam_channel::{bounded, Receiver, TrySendError};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

use super::types::{Listener, ListenerId, ListenerSet, Unsubscribe};

/// Default label for channels created with [`EventChannel::new`].
const DEFAULT_LABEL: &str = "events";

/// Shared listener list. Tokens hold a `Weak` to this.
struct Registry<E> {
    label: &'static str,
    /// Active listeners in subscription order.
    listeners: Mutex<Vec<(ListenerId, Listener<E>)>>,
    /// Counter for generating listener IDs.
    next_id: AtomicU64,
}

impl<E: 'static> ListenerSet for Registry<E> {
    fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        match listeners.iter().position(|(lid, _)| *lid == id) {
            Some(pos) => {
                listeners.remove(pos);
                debug!(channel = self.label, listener = id.0, "listener removed");
                true
            }
            None => false,
        }
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.listeners.lock().iter().any(|(lid, _)| *lid == id)
    }
}

/// Synchronous publish/subscribe channel for events of type `E`.
///
/// Listeners run on the publishing thread, in subscription order. `publish`
/// works on a snapshot of the listener list taken on entry, so listeners may
/// subscribe or unsubscribe (themselves included) while an event is in
/// flight. A listener removed mid-dispatch can still see that one event but
/// none after it.
///
/// Dispatch is fail-fast: the first listener error is returned from
/// `publish` and the remaining listeners are skipped.
pub struct EventChannel<E> {
    registry: Arc<Registry<E>>,
}

impl<E: 'static> EventChannel<E> {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::with_label(DEFAULT_LABEL)
    }

    /// Create an empty channel whose errors and logs carry `label`.
    pub fn with_label(label: &'static str) -> Self {
        Self {
            registry: Arc::new(Registry {
                label,
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        self.registry.label
    }

    /// Register a listener.
    ///
    /// Registering the same callback twice creates two entries, each with its
    /// own token.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&E) -> std::result::Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.subscribe_arc(Arc::new(listener))
    }

    /// Register an already shared listener.
    pub fn subscribe_arc(&self, listener: Listener<E>) -> Unsubscribe {
        let id = self.next_id();
        self.registry.listeners.lock().push((id, listener));
        debug!(channel = self.registry.label, listener = id.0, "listener added");
        Unsubscribe::new(self.weak_set(), id)
    }

    /// Forward every event to a bounded crossbeam channel.
    ///
    /// When the buffer is full or the receiver has been dropped the
    /// subscription removes itself. Publishing never fails because of it.
    pub fn subscribe_channel(&self, capacity: usize) -> (Receiver<E>, Unsubscribe)
    where
        E: Clone + Send,
    {
        let (sender, receiver) = bounded(capacity.max(1));
        let id = self.next_id();
        let registry: Weak<Registry<E>> = Arc::downgrade(&self.registry);
        let label = self.registry.label;

        let forward = move |event: &E| -> std::result::Result<(), ListenerError> {
            match sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(
                        channel = label,
                        listener = id.0,
                        "channel subscriber overflowed, dropping"
                    );
                    if let Some(registry) = registry.upgrade() {
                        registry.remove(id);
                    }
                }
                Err(TrySendError::Disconnected(_)) => {
                    if let Some(registry) = registry.upgrade() {
                        registry.remove(id);
                    }
                }
            }
            Ok(())
        };

        self.registry.listeners.lock().push((id, Arc::new(forward)));
        debug!(channel = label, listener = id.0, capacity, "channel subscriber added");
        (receiver, Unsubscribe::new(self.weak_set(), id))
    }

    /// Deliver `event` to every listener active at the time of the call.
    pub fn publish(&self, event: &E) -> Result<()> {
        let snapshot: Vec<Listener<E>> = self
            .registry
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        trace!(
            channel = self.registry.label,
            listeners = snapshot.len(),
            "publishing event"
        );

        for listener in snapshot {
            listener(event).map_err(|source| StoreError::Listener {
                channel: self.registry.label,
                source,
            })?;
        }
        Ok(())
    }

    /// Number of active listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.listeners.lock().len()
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.registry.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn weak_set(&self) -> Weak<dyn ListenerSet> {
        let weak: Weak<Registry<E>> = Arc::downgrade(&self.registry);
        weak
    }
}

impl<E: 'static> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("label", &self.registry.label)
            .field("listeners", &self.registry.listeners.lock().len())
            .finish()
    }
}
