//! # Assist Memory
//!
//! Per-session conversation history with a bounded context window, lossy
//! summarization of trimmed messages, and a JSON snapshot mirror.
//!
//! ## Example
//!
//! ```
//! use assist_memory::{MemoryOptions, Metadata, Role, SessionStore};
//!
//! let store = SessionStore::open(MemoryOptions::in_memory()).unwrap();
//! let id = store.create_session(None);
//! store.add_message(&id, Role::User, "Why did the SMTP send fail?", Metadata::new());
//!
//! assert_eq!(store.conversation_context(&id).len(), 1);
//! ```

mod config;
mod error;
mod persist;
mod store;
mod sweep;
pub mod timestamp;
mod types;
pub mod window;

pub use config::{MemoryOptions, StorageBackend};
pub use error::{MemoryError, Result};
pub use persist::{JsonFileMirror, NullMirror, SessionMap, SessionMirror};
pub use store::SessionStore;
pub use sweep::{spawn_expiry_sweep, MIN_SWEEP_PERIOD};
pub use types::{
    ConversationTurn, Message, Metadata, Role, Session, SessionInfo, SessionMetadata, StoreStats,
};
