//! Persistent chat history
//!
//! - `types`: messages and conversations in their persisted layout
//! - `kv`: the injected key-value capability and its backends
//! - `conversations`: CRUD, retention, and derived titles/previews

use crate::config::StorageConfig;
use crate::error::{Result, SchoolfinderError};
use directories::ProjectDirs;
use std::path::PathBuf;

pub mod conversations;
pub mod kv;
pub mod types;

pub use conversations::{truncate_with_marker, ConversationStore, StoreSettings};
pub use kv::{KeyValueStore, MemoryStore, SledStore};
pub use types::{Conversation, Message, Role};

/// Resolve where the sled database lives
///
/// Uses `storage.path` when set (already merged from file, environment and
/// CLI), otherwise the platform data directory.
pub fn resolve_store_path(config: &StorageConfig) -> Result<PathBuf> {
    if let Some(path) = &config.path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("org", "schoolfinder", "schoolfinder")
        .ok_or_else(|| SchoolfinderError::Storage("Could not determine data directory".into()))?;

    Ok(proj_dirs.data_dir().join("store"))
}

/// Open the durable conversation store described by `config`
pub fn open_conversation_store(config: &StorageConfig) -> Result<ConversationStore<SledStore>> {
    let path = resolve_store_path(config)?;
    tracing::debug!("Using conversation store at {}", path.display());
    let backend = SledStore::open(path)?;
    Ok(ConversationStore::with_settings(backend, config.store_settings()))
}
