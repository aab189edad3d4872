//! Listener and subscription types.

use crate::error::ListenerError;
use std::fmt;
use std::sync::{Arc, Weak};

/// A registered callback. Returning an error aborts the current publish.
pub type Listener<E> =
    Arc<dyn Fn(&E) -> std::result::Result<(), ListenerError> + Send + Sync + 'static>;

/// Identifier of one registration within a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Type-erased view of a channel's listener list, used by [`Unsubscribe`].
pub(crate) trait ListenerSet: Send + Sync {
    /// Remove a registration. Returns false if it was already gone.
    fn remove(&self, id: ListenerId) -> bool;

    fn contains(&self, id: ListenerId) -> bool;
}

/// Token returned by `subscribe`.
///
/// Calling [`Unsubscribe::unsubscribe`] removes exactly the registration that
/// produced this token; later calls are no-ops. Dropping the token leaves the
/// listener registered. The token only holds a weak reference to its channel,
/// and may be invoked from inside the listener it refers to.
#[derive(Clone)]
pub struct Unsubscribe {
    pub(crate) set: Weak<dyn ListenerSet>,
    pub(crate) id: ListenerId,
}

impl Unsubscribe {
    pub(crate) fn new(set: Weak<dyn ListenerSet>, id: ListenerId) -> Self {
        Self { set, id }
    }

    /// Remove the listener. Returns true if this call removed it.
    pub fn unsubscribe(&self) -> bool {
        match self.set.upgrade() {
            Some(set) => set.remove(self.id),
            None => false,
        }
    }

    /// True while the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.set
            .upgrade()
            .map(|set| set.contains(self.id))
            .unwrap_or(false)
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
