//! Conversation persistence over a single key-value slot
//!
//! The whole collection is serialized as one JSON array and written back in
//! full on every mutation. Public operations never fail: backend and
//! serialization errors are logged and degrade to an empty or no-op result.

use super::kv::KeyValueStore;
use super::types::{Conversation, Message, Role};
use crate::error::{Result, SchoolfinderError};
use anyhow::Context;
use chrono::Utc;
use rand::Rng;

/// Slot key holding the serialized conversation collection
pub const DEFAULT_STORAGE_KEY: &str = "schoolfinder_conversations";

/// Maximum number of conversations retained on create
pub const DEFAULT_MAX_CONVERSATIONS: usize = 50;

/// Maximum title length in characters before truncation
pub const DEFAULT_TITLE_MAX_CHARS: usize = 50;

/// Maximum preview length in characters before truncation
pub const DEFAULT_PREVIEW_MAX_CHARS: usize = 100;

/// Appended to truncated titles and previews
pub const TRUNCATION_MARKER: &str = "...";

/// Title used when no user message exists
pub const FALLBACK_TITLE: &str = "New Conversation";

/// Preview used at creation when no assistant message exists
pub const FALLBACK_PREVIEW: &str = "No response yet";

const ID_SUFFIX_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Tunables for a [`ConversationStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Slot key in the backend
    pub storage_key: String,
    /// Retention cap enforced on create
    pub max_conversations: usize,
    /// Title truncation length
    pub title_max_chars: usize,
    /// Preview truncation length
    pub preview_max_chars: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            preview_max_chars: DEFAULT_PREVIEW_MAX_CHARS,
        }
    }
}

/// Truncate `text` to `max_chars` characters, appending the truncation marker
///
/// Text at or under the limit is returned unchanged. Lengths are counted in
/// characters, so multi-byte text is never split inside a character.
///
/// # Examples
///
/// ```
/// use schoolfinder::storage::truncate_with_marker;
///
/// assert_eq!(truncate_with_marker("short", 10), "short");
/// assert_eq!(truncate_with_marker("abcdefghij", 4), "abcd...");
/// ```
pub fn truncate_with_marker(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Durable CRUD over the conversation collection
///
/// Generic over the injected [`KeyValueStore`] so callers choose the medium.
pub struct ConversationStore<S> {
    backend: S,
    settings: StoreSettings,
}

impl<S: KeyValueStore> ConversationStore<S> {
    /// Create a store with default settings
    pub fn new(backend: S) -> Self {
        Self::with_settings(backend, StoreSettings::default())
    }

    /// Create a store with explicit settings
    pub fn with_settings(backend: S, settings: StoreSettings) -> Self {
        Self { backend, settings }
    }

    /// Settings in effect
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Underlying backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Persist a new conversation built from `messages`
    ///
    /// Returns the generated id, or `None` if `messages` is empty or the
    /// write failed. On failure the stored collection is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use schoolfinder::storage::{ConversationStore, MemoryStore, Message};
    ///
    /// let store = ConversationStore::new(MemoryStore::new());
    /// let id = store
    ///     .create(&[Message::user("Schools near me?"), Message::assistant("Here you go")])
    ///     .unwrap();
    /// let conv = store.get(&id).unwrap();
    /// assert_eq!(conv.title, "Schools near me?");
    /// assert_eq!(conv.preview, "Here you go");
    /// ```
    pub fn create(&self, messages: &[Message]) -> Option<String> {
        if messages.is_empty() {
            return None;
        }

        match self.try_create(messages) {
            Ok(id) => {
                tracing::debug!("Saved conversation {} ({} messages)", id, messages.len());
                Some(id)
            }
            Err(e) => {
                tracing::error!("Error saving conversation: {:#}", e);
                None
            }
        }
    }

    fn try_create(&self, messages: &[Message]) -> Result<String> {
        let title = messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| truncate_with_marker(&m.content, self.settings.title_max_chars))
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        let preview = messages
            .iter()
            .find(|m| m.role == Role::Assistant)
            .map(|m| truncate_with_marker(&m.content, self.settings.preview_max_chars))
            .unwrap_or_else(|| FALLBACK_PREVIEW.to_string());

        let conversation = Conversation {
            id: generate_conversation_id(),
            title,
            messages: messages.to_vec(),
            last_updated: Utc::now(),
            preview,
        };
        let id = conversation.id.clone();

        let mut collection = Vec::with_capacity(self.settings.max_conversations);
        collection.push(conversation);
        collection.extend(self.list());

        if collection.len() > self.settings.max_conversations {
            let evicted = collection.len() - self.settings.max_conversations;
            collection.truncate(self.settings.max_conversations);
            tracing::info!("Evicted {} oldest conversation(s) over retention cap", evicted);
        }

        self.write(&collection)?;
        Ok(id)
    }

    /// Replace the messages of an existing conversation
    ///
    /// Refreshes `last_updated` and re-derives the preview from the last
    /// assistant message. When the new messages hold no assistant message
    /// the previous preview is kept. Unknown ids are ignored.
    pub fn update(&self, conversation_id: &str, messages: &[Message]) {
        match self.try_update(conversation_id, messages) {
            Ok(true) => tracing::debug!("Updated conversation {}", conversation_id),
            Ok(false) => tracing::debug!("No conversation {} to update", conversation_id),
            Err(e) => tracing::error!("Error updating conversation: {:#}", e),
        }
    }

    fn try_update(&self, conversation_id: &str, messages: &[Message]) -> Result<bool> {
        let mut collection = self.list();
        let Some(conversation) = collection.iter_mut().find(|c| c.id == conversation_id) else {
            return Ok(false);
        };

        conversation.messages = messages.to_vec();
        conversation.last_updated = Utc::now();

        if let Some(last_assistant) = messages.iter().rev().find(|m| m.role == Role::Assistant) {
            conversation.preview =
                truncate_with_marker(&last_assistant.content, self.settings.preview_max_chars);
        }

        self.write(&collection)?;
        Ok(true)
    }

    /// All stored conversations in storage order
    ///
    /// Absent or unreadable data yields an empty list.
    pub fn list(&self) -> Vec<Conversation> {
        match self.try_list() {
            Ok(conversations) => conversations,
            Err(e) => {
                tracing::error!("Error loading conversations: {:#}", e);
                Vec::new()
            }
        }
    }

    fn try_list(&self) -> Result<Vec<Conversation>> {
        let Some(raw) = self.backend.get(&self.settings.storage_key)? else {
            return Ok(Vec::new());
        };

        let conversations: Vec<Conversation> =
            serde_json::from_str(&raw)
                .map_err(SchoolfinderError::Serialization)
                .context("Failed to deserialize conversations")?;
        Ok(conversations)
    }

    /// All stored conversations, most recently updated first
    pub fn list_recent(&self) -> Vec<Conversation> {
        let mut conversations = self.list();
        conversations.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        conversations
    }

    /// Look up a conversation by id
    pub fn get(&self, conversation_id: &str) -> Option<Conversation> {
        self.list().into_iter().find(|c| c.id == conversation_id)
    }

    /// Remove a conversation; unknown ids are ignored
    pub fn delete(&self, conversation_id: &str) {
        match self.try_delete(conversation_id) {
            Ok(true) => tracing::info!("Deleted conversation {}", conversation_id),
            Ok(false) => tracing::debug!("No conversation {} to delete", conversation_id),
            Err(e) => tracing::error!("Error deleting conversation: {:#}", e),
        }
    }

    fn try_delete(&self, conversation_id: &str) -> Result<bool> {
        let mut collection = self.list();
        let before = collection.len();
        collection.retain(|c| c.id != conversation_id);

        if collection.len() == before {
            return Ok(false);
        }

        self.write(&collection)?;
        Ok(true)
    }

    /// Remove the whole persisted collection
    pub fn clear_all(&self) {
        if let Err(e) = self.backend.remove(&self.settings.storage_key) {
            tracing::error!("Error clearing conversations: {:#}", e);
        } else {
            tracing::info!("Cleared all conversations");
        }
    }

    fn write(&self, collection: &[Conversation]) -> Result<()> {
        let json = serde_json::to_string(collection)
            .map_err(SchoolfinderError::Serialization)
            .context("Failed to serialize conversations")?;
        self.backend
            .set(&self.settings.storage_key, &json)
            .context("Failed to write conversations")?;
        Ok(())
    }
}

/// Generate `conv_<unix millis>_<random base36 suffix>`
fn generate_conversation_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("conv_{}_{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryStore;
    use std::collections::HashSet;
    use std::thread::sleep;
    use std::time::Duration;

    fn exchange(question: &str, answer: &str) -> Vec<Message> {
        vec![Message::user(question).as_question(), Message::assistant(answer)]
    }

    #[test]
    fn test_create_returns_id_and_get_returns_messages() {
        let store = ConversationStore::new(MemoryStore::new());
        let messages = exchange("Best schools near me?", "Here are the top-rated schools");

        let id = store.create(&messages).expect("create failed");
        assert!(!id.is_empty());

        let conv = store.get(&id).expect("conversation missing");
        assert_eq!(conv.messages, messages);
        assert_eq!(conv.title, "Best schools near me?");
        assert_eq!(conv.preview, "Here are the top-rated schools");
    }

    #[test]
    fn test_create_empty_returns_none_and_leaves_store_untouched() {
        let store = ConversationStore::new(MemoryStore::new());
        let id = store.create(&exchange("a", "b")).unwrap();

        assert_eq!(store.create(&[]), None);

        let all = store.list();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
    }

    #[test]
    fn test_create_prepends_newest() {
        let store = ConversationStore::new(MemoryStore::new());
        let first = store.create(&exchange("first", "one")).unwrap();
        let second = store.create(&exchange("second", "two")).unwrap();

        let ids: Vec<String> = store.list().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_create_evicts_oldest_beyond_cap() {
        let store = ConversationStore::new(MemoryStore::new());
        let first = store.create(&exchange("q0", "a0")).unwrap();
        for i in 1..=50 {
            store
                .create(&exchange(&format!("q{}", i), &format!("a{}", i)))
                .unwrap();
        }

        let all = store.list();
        assert_eq!(all.len(), 50);
        assert!(all.iter().all(|c| c.id != first));
        assert!(store.get(&first).is_none());
    }

    #[test]
    fn test_custom_cap_is_enforced() {
        let settings = StoreSettings {
            max_conversations: 3,
            ..StoreSettings::default()
        };
        let store = ConversationStore::with_settings(MemoryStore::new(), settings);
        for i in 0..5 {
            store.create(&exchange(&format!("q{}", i), "a")).unwrap();
        }
        let titles: Vec<String> = store.list().into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["q4", "q3", "q2"]);
    }

    #[test]
    fn test_ids_unique_under_rapid_creates() {
        let store = ConversationStore::new(MemoryStore::new());
        let ids: HashSet<String> = (0..30)
            .map(|_| store.create(&exchange("same", "same")).unwrap())
            .collect();
        assert_eq!(ids.len(), 30);
        assert!(ids.iter().all(|id| id.starts_with("conv_")));
    }

    #[test]
    fn test_title_truncated_at_fifty_chars() {
        let store = ConversationStore::new(MemoryStore::new());
        let long = "x".repeat(60);
        let id = store.create(&[Message::user(long.clone())]).unwrap();
        let conv = store.get(&id).unwrap();
        assert_eq!(conv.title, format!("{}...", &long[..50]));

        let id = store.create(&[Message::user("0123456789")]).unwrap();
        assert_eq!(store.get(&id).unwrap().title, "0123456789");
    }

    #[test]
    fn test_title_uses_first_user_message() {
        let store = ConversationStore::new(MemoryStore::new());
        let messages = vec![
            Message::assistant("Welcome!"),
            Message::user("First question"),
            Message::user("Second question"),
        ];
        let id = store.create(&messages).unwrap();
        assert_eq!(store.get(&id).unwrap().title, "First question");
    }

    #[test]
    fn test_fallbacks_without_user_or_assistant() {
        let store = ConversationStore::new(MemoryStore::new());
        let id = store.create(&[Message::assistant("Welcome!")]).unwrap();
        assert_eq!(store.get(&id).unwrap().title, FALLBACK_TITLE);

        let id = store.create(&[Message::user("Hello")]).unwrap();
        assert_eq!(store.get(&id).unwrap().preview, FALLBACK_PREVIEW);
    }

    #[test]
    fn test_preview_at_create_uses_first_assistant_message() {
        let store = ConversationStore::new(MemoryStore::new());
        let long = "y".repeat(120);
        let messages = vec![
            Message::assistant(long.clone()),
            Message::user("q"),
            Message::assistant("later answer"),
        ];
        let id = store.create(&messages).unwrap();
        assert_eq!(store.get(&id).unwrap().preview, format!("{}...", &long[..100]));
    }

    #[test]
    fn test_update_replaces_messages_and_refreshes_preview() {
        let store = ConversationStore::new(MemoryStore::new());
        let mut messages = exchange("q1", "a1");
        let id = store.create(&messages).unwrap();
        let before = store.get(&id).unwrap();

        sleep(Duration::from_millis(5));
        messages.push(Message::user("q2"));
        messages.push(Message::assistant("a2"));
        store.update(&id, &messages);

        let after = store.get(&id).unwrap();
        assert_eq!(after.messages, messages);
        assert_eq!(after.preview, "a2");
        assert_eq!(after.title, before.title);
        assert!(after.last_updated >= before.last_updated);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_update_without_assistant_keeps_previous_preview() {
        let store = ConversationStore::new(MemoryStore::new());
        let id = store.create(&exchange("q1", "a1")).unwrap();

        store.update(&id, &[Message::user("only user now")]);

        let conv = store.get(&id).unwrap();
        assert_eq!(conv.preview, "a1");
        assert_eq!(conv.messages.len(), 1);
    }

    #[test]
    fn test_update_keeps_storage_position() {
        let store = ConversationStore::new(MemoryStore::new());
        let older = store.create(&exchange("older", "a")).unwrap();
        let newer = store.create(&exchange("newer", "b")).unwrap();

        sleep(Duration::from_millis(5));
        store.update(&older, &exchange("older", "updated"));

        let stored: Vec<String> = store.list().into_iter().map(|c| c.id).collect();
        assert_eq!(stored, vec![newer.clone(), older.clone()]);

        let recent: Vec<String> = store.list_recent().into_iter().map(|c| c.id).collect();
        assert_eq!(recent, vec![older, newer]);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let store = ConversationStore::new(MemoryStore::new());
        store.create(&exchange("q", "a")).unwrap();
        let before = store.list();

        store.update("conv_missing", &exchange("other", "other"));

        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_update_never_evicts() {
        let settings = StoreSettings {
            max_conversations: 2,
            ..StoreSettings::default()
        };
        let store = ConversationStore::with_settings(MemoryStore::new(), settings);
        let a = store.create(&exchange("a", "a")).unwrap();
        store.create(&exchange("b", "b")).unwrap();

        store.update(&a, &exchange("a", "a2"));
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_delete_removes_only_matching() {
        let store = ConversationStore::new(MemoryStore::new());
        let keep = store.create(&exchange("keep", "k")).unwrap();
        let removed = store.create(&exchange("drop", "d")).unwrap();
        let kept_before = store.get(&keep).unwrap();

        store.delete(&removed);

        let all = store.list();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], kept_before);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let store = ConversationStore::new(MemoryStore::new());
        store.create(&exchange("q", "a")).unwrap();
        let before = store.list();

        store.delete("conv_missing");
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_clear_all_empties_list() {
        let store = ConversationStore::new(MemoryStore::new());
        store.create(&exchange("q", "a")).unwrap();
        store.clear_all();
        assert!(store.list().is_empty());
        assert_eq!(store.backend().get(DEFAULT_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_data_lists_empty() {
        let backend = MemoryStore::new();
        backend.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let store = ConversationStore::new(backend);

        assert!(store.list().is_empty());
        assert!(store.get("anything").is_none());

        let err = store.try_list().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchoolfinderError>(),
            Some(SchoolfinderError::Serialization(_))
        ));
    }

    #[test]
    fn test_quota_failure_on_create_keeps_existing_collection() {
        let store = ConversationStore::new(MemoryStore::with_quota(2048));
        let id = store.create(&exchange("small", "small")).unwrap();
        let before = store.list();

        let huge = "z".repeat(4096);
        assert_eq!(store.create(&exchange(&huge, &huge)), None);

        assert_eq!(store.list(), before);
        assert!(store.get(&id).is_some());
    }

    #[test]
    fn test_round_trip_preserves_collection() {
        let store = ConversationStore::new(MemoryStore::new());
        let results = vec![serde_json::json!({"id": "1", "name": "Greenwood Primary Academy", "rating": 4.8})];
        let messages = vec![
            Message::user("Outstanding schools?").as_question(),
            Message::assistant("These schools are rated Outstanding").with_school_results(results),
        ];
        store.create(&messages).unwrap();
        store.create(&exchange("second", "two")).unwrap();

        let listed = store.list();
        let json = serde_json::to_string(&listed).unwrap();
        let parsed: Vec<Conversation> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, listed);
    }

    #[test]
    fn test_truncate_with_marker_counts_chars() {
        assert_eq!(truncate_with_marker("", 5), "");
        assert_eq!(truncate_with_marker("abcde", 5), "abcde");
        assert_eq!(truncate_with_marker("abcdef", 5), "abcde...");
        assert_eq!(truncate_with_marker("ééééé", 3), "ééé...");
    }
}
