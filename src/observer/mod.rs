//! Observer primitives used by the record store.
//!
//! An [`EventChannel`] is a synchronous publish/subscribe list:
//! - `subscribe` returns an [`Unsubscribe`] token
//! - `publish` calls every active listener in subscription order
//! - `subscribe_channel` forwards events into a bounded crossbeam channel
//!
//! # Example
//!
//! ```
//! use observable_store::EventChannel;
//!
//! let channel = EventChannel::<String>::new();
//! let token = channel.subscribe(|name: &String| {
//!     println!("added {}", name);
//!     Ok(())
//! });
//!
//! channel.publish(&"bulbasaur".to_string()).unwrap();
//! token.unsubscribe();
//! ```

mod channel;
mod types;

pub use channel::EventChannel;
pub use types::{Listener, ListenerId, Unsubscribe};
