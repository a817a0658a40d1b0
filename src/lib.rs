//! SchoolFinder - conversational school search library
//!
//! This library provides the pieces behind the `schoolfinder` binary: a
//! persisted, capped conversation history over an injected key-value store,
//! the assistant chat session, and the assistant/classic view switch.
//!
//! # Architecture
//!
//! - `storage`: conversation types, key-value backends, and the conversation store
//! - `session`: working state of the assistant chat, with auto-save
//! - `responder`: assistant reply producers and the cancellable reply task
//! - `handoff`: one-shot resume channel from history to chat
//! - `history`: sorted, filterable history rows
//! - `view_mode`: assistant/classic mode switching
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```
//! use schoolfinder::storage::{ConversationStore, MemoryStore, Message};
//!
//! let store = ConversationStore::new(MemoryStore::new());
//! let id = store
//!     .create(&[Message::user("Good primary schools?"), Message::assistant("Sure!")])
//!     .unwrap();
//! assert_eq!(store.get(&id).unwrap().title, "Good primary schools?");
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod handoff;
pub mod history;
pub mod responder;
pub mod session;
pub mod storage;
pub mod view_mode;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SchoolfinderError};
pub use session::ChatSession;
pub use storage::{Conversation, ConversationStore, KeyValueStore, Message, Role};
pub use view_mode::{SearchContainer, ViewMode};

#[cfg(test)]
pub mod test_utils;
