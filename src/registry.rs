//! Store creation policies.
//!
//! Two ways to obtain a [`RecordStore`]:
//! - [`Factory`]: every call builds a new, independent store
//! - [`StoreRegistry`]: one store per record type, built on first use
//!
//! Both implement [`StoreProvider`]. A deployment picks one of them, usually
//! through [`Provider`], and hands it to the code that needs stores.

use crate::store::{RecordStore, StoreConfig};
use crate::types::Record;
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Source of record stores.
pub trait StoreProvider {
    /// Get a store for records of type `T`.
    fn store<T: Record>(&self) -> Arc<RecordStore<T>>;
}

/// Build a new, empty store with default configuration.
pub fn create_store<T: Record>() -> Arc<RecordStore<T>> {
    Arc::new(RecordStore::new())
}

/// Multi-instance policy: each call returns a fresh store.
#[derive(Clone, Debug, Default)]
pub struct Factory {
    config: StoreConfig,
}

impl Factory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose stores start from `config`.
    pub fn with_config(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Build a new store.
    pub fn create<T: Record>(&self) -> Arc<RecordStore<T>> {
        Arc::new(RecordStore::with_config(self.config.clone()))
    }
}

impl StoreProvider for Factory {
    fn store<T: Record>(&self) -> Arc<RecordStore<T>> {
        self.create()
    }
}

type AnyStore = Arc<dyn Any + Send + Sync>;

/// Singleton policy: at most one store per record type.
///
/// The registry is an ordinary value. Whoever owns it decides its scope,
/// typically one per process held by the application's entry point.
pub struct StoreRegistry {
    /// Stores keyed by the `TypeId` of their record type.
    stores: RwLock<HashMap<TypeId, AnyStore>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// The store for `T`, created on first use.
    ///
    /// A store created here is named after the record type (its
    /// `std::any::type_name`) and otherwise uses `StoreConfig::default()`.
    pub fn instance<T: Record>(&self) -> Arc<RecordStore<T>> {
        self.instance_with(StoreConfig::named(type_name::<T>()))
    }

    /// The store for `T`.
    ///
    /// `config` is only used if this call creates the store; an existing store
    /// keeps the configuration it was created with.
    pub fn instance_with<T: Record>(&self, config: StoreConfig) -> Arc<RecordStore<T>> {
        let key = TypeId::of::<T>();
        if let Some(existing) = self.stores.read().get(&key) {
            return downcast(existing);
        }

        let mut stores = self.stores.write();
        let entry = stores.entry(key).or_insert_with(|| {
            info!(
                record_type = type_name::<T>(),
                store = %config.name,
                "initializing singleton store"
            );
            let store: AnyStore = Arc::new(RecordStore::<T>::with_config(config));
            store
        });
        downcast(entry)
    }

    /// The store for `T` if one has been created.
    pub fn get<T: Record>(&self) -> Option<Arc<RecordStore<T>>> {
        self.stores
            .read()
            .get(&TypeId::of::<T>())
            .map(downcast::<T>)
    }

    pub fn contains<T: Record>(&self) -> bool {
        self.stores.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of record types with a store.
    pub fn len(&self) -> usize {
        self.stores.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Recover the typed store from a registry entry.
///
/// Entries are only inserted by `instance_with::<T>`, under `TypeId::of::<T>()`
/// and holding a `RecordStore<T>`, so the downcast cannot fail.
fn downcast<T: Record>(store: &AnyStore) -> Arc<RecordStore<T>> {
    Arc::clone(store)
        .downcast::<RecordStore<T>>()
        .expect("registry entries are keyed by their record type")
}

impl StoreProvider for StoreRegistry {
    fn store<T: Record>(&self) -> Arc<RecordStore<T>> {
        self.instance()
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("stores", &self.len())
            .finish()
    }
}

/// The creation policy chosen for a deployment.
#[derive(Debug)]
pub enum Provider {
    MultiInstance(Factory),
    Singleton(StoreRegistry),
}

impl Provider {
    pub fn multi_instance() -> Self {
        Provider::MultiInstance(Factory::new())
    }

    pub fn singleton() -> Self {
        Provider::Singleton(StoreRegistry::new())
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self, Provider::Singleton(_))
    }
}

impl StoreProvider for Provider {
    fn store<T: Record>(&self) -> Arc<RecordStore<T>> {
        match self {
            Provider::MultiInstance(factory) => factory.store(),
            Provider::Singleton(registry) => registry.store(),
        }
    }
}
