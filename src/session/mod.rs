//! Per-user conversation handling.
//!
//! # Architecture
//!
//! ```text
//! ChatEvent (text / voice)
//!        │
//!        ▼
//! ConversationMachine::dispatch()       ← one event at a time
//!        │
//!        ├─ SessionStore ── Session { state, pending entry }
//!        │
//!        ├─ capture flow ── VoiceAudio + RecognitionGateway + EntryStore
//!        │
//!        └─ query flow ─── EntryStore + formatter
//!        │
//!        ▼
//! Vec<Reply>  ── shipped by the transport event loop
//! ```
//!
//! Sessions are process-lifetime only; a restart resets every user to idle
//! and loses any entry still under construction.

pub mod commands;
pub mod machine;
pub mod reply;
pub mod session;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use commands::{parse_count, parse_delete_command, DateShortcut, QueryTrigger};
pub use machine::{ChatEvent, ConversationMachine};
pub use reply::{language_button, responses, Keyboard, Reply};
pub use session::{Session, SessionStore};
pub use state::SessionState;
