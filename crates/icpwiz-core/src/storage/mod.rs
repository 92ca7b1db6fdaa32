//! Local cache layer
//!
//! A string key/value store (the browser `localStorage` analogue) plus a typed
//! service that keeps workspaces, wizard answers, and collaborator lists under
//! fixed keys. Used as a read-through cache in front of the backend.

pub mod local_store;
pub mod service;

pub use local_store::{FileStore, LocalStore, MemoryStore};
pub use service::{ScopedKey, StorageService, COLLABORATORS_KEY, ICP_DATA_KEY, WORKSPACES_KEY};
