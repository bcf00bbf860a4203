//! Entry persistence.
//!
//! [`EntryStore`] is the async query façade the conversation layer talks
//! to; [`FirebaseStore`] is the remote document backend and [`MemoryStore`]
//! the in-process one (local runs, tests). Which backend serves a process
//! is a configuration choice made once at startup.

pub mod entry_store;
pub mod firebase;
pub mod memory;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use entry_store::{EntryStore, StoreError, UserId};
pub use firebase::FirebaseStore;
pub use memory::MemoryStore;
