//! # Observable Store
//!
//! An in-process record store with change notification, built from a handful
//! of small, composable pieces.
//!
//! ## Core Concepts
//!
//! - **Records**: any value with a non-empty string id ([`Record`])
//! - **Event channels**: synchronous publish/subscribe ([`EventChannel`])
//! - **Record store**: keyed records with before/after-add events ([`RecordStore`])
//! - **Visitors and strategies**: full scans and best-of selection
//! - **Providers**: one store per call ([`Factory`]) or per type ([`StoreRegistry`])
//! - **Feeds**: external records written through [`FeedAdapter`]
//!
//! ## Example
//!
//! ```
//! use observable_store::{Pokemon, StoreRegistry};
//!
//! let registry = StoreRegistry::new();
//! let pokedex = registry.instance::<Pokemon>();
//!
//! let unsubscribe = pokedex.on_after_add(|event| {
//!     println!("new pokemon added: {:?}", event.value);
//!     Ok(())
//! });
//!
//! pokedex.set(Pokemon::new("bulbasaur", 50, 10))?;
//! unsubscribe.unsubscribe();
//! pokedex.set(Pokemon::new("squirtle", 40, 30))?;
//!
//! pokedex.visit(|p: &Pokemon| println!("{}", p.id));
//! # Ok::<(), observable_store::StoreError>(())
//! ```

pub mod error;
pub mod feed;
pub mod observer;
pub mod pokemon;
pub mod registry;
pub mod store;
pub mod traversal;
pub mod types;

// Re-exports
pub use error::{ListenerError, Result, StoreError};
pub use feed::FeedAdapter;
pub use observer::{EventChannel, Listener, ListenerId, Unsubscribe};
pub use pokemon::{ByAttack, ByDefense, ByTotal, Pokemon};
pub use registry::{create_store, Factory, Provider, StoreProvider, StoreRegistry};
pub use store::{RecordStore, StoreConfig};
pub use traversal::{best_of, RecordVisitor, ScoreStrategy};
pub use types::{AfterSetEvent, BeforeSetEvent, Record};
