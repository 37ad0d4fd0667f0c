//! Persistence for murmur.
//!
//! The engine only needs "get/set/remove by logical name". [`KeyValueStore`]
//! is that boundary; [`SaveManager`] layers the play-state snapshot, the
//! message transcript, and the export bundle on top of it, and [`Settings`]
//! keeps the player's preferences in the same store.

pub mod error;
pub mod save;
pub mod settings;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use save::{SaveBundle, SaveManager};
pub use settings::{SETTING_KEYS, Settings, Theme};
pub use store::{FileStore, KeyValueStore, MemoryStore};
