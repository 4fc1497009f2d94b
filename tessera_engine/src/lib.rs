#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const TESSERA_VERSION: &str = env!("CARGO_PKG_VERSION");

// Content model
pub mod conversation;
pub mod event;
pub mod lock;
pub mod persist;

// Loading and storage
pub mod data_paths;
pub mod loader;
pub mod save_files;
pub mod slug;

// Re-exports for convenience
pub use conversation::{Conversation, ConversationEntry, EntryIndex};
pub use event::{Event, EventKind, EventType};
pub use loader::{load_conversation, load_event, load_lock};
pub use lock::{Lock, LockKind, LockType};
pub use persist::{PersistError, Persistable};
pub use save_files::{DocumentKind, SaveDocument};
