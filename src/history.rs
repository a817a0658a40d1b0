//! Chat history view model
//!
//! Turns stored conversations into display rows: most recently updated
//! first, optionally filtered by a case-insensitive search over title and
//! preview, with human-friendly relative dates.

use crate::handoff::ResumeSender;
use crate::storage::{Conversation, ConversationStore, KeyValueStore};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

/// One display row of the history list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Conversation id
    pub id: String,
    /// Derived title
    pub title: String,
    /// Derived preview
    pub preview: String,
    /// Relative last-updated label ("Yesterday", "3 days ago", ...)
    pub updated: String,
    /// Number of messages
    pub message_count: usize,
}

/// Sorted, filterable view over stored conversations
#[derive(Debug, Clone)]
pub struct HistoryView {
    conversations: Vec<Conversation>,
}

impl HistoryView {
    /// Build a view, most recently updated first
    pub fn new(mut conversations: Vec<Conversation>) -> Self {
        conversations.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Self { conversations }
    }

    /// Load every conversation from `store`
    pub fn load<S: KeyValueStore>(store: &ConversationStore<S>) -> Self {
        Self::new(store.list())
    }

    /// Keep conversations whose title or preview contains `query`
    ///
    /// Matching ignores case; a blank query keeps everything.
    pub fn filter(mut self, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        if !needle.is_empty() {
            self.conversations.retain(|c| {
                c.title.to_lowercase().contains(&needle)
                    || c.preview.to_lowercase().contains(&needle)
            });
        }
        self
    }

    /// Conversations in display order
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Whether nothing is shown
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Display rows relative to `now`
    pub fn entries(&self, now: DateTime<Utc>) -> Vec<HistoryEntry> {
        self.conversations
            .iter()
            .map(|c| HistoryEntry {
                id: c.id.clone(),
                title: c.title.clone(),
                preview: c.preview.clone(),
                updated: format_relative_date(c.last_updated, now),
                message_count: c.message_count(),
            })
            .collect()
    }
}

/// Format `date` relative to `now`
///
/// Same day shows the local time, one day back shows "Yesterday", under a
/// week shows "N days ago", anything older shows the local date.
pub fn format_relative_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - date).num_days();
    let local = date.with_timezone(&Local);

    match days {
        d if d <= 0 => local.format("%H:%M").to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{} days ago", d),
        _ => local.format("%Y-%m-%d").to_string(),
    }
}

/// Look up `conversation_id` and hand it to the chat view
///
/// Returns false if the conversation does not exist or the chat view is gone.
pub fn request_resume<S: KeyValueStore>(
    store: &ConversationStore<S>,
    conversation_id: &str,
    sender: ResumeSender,
) -> bool {
    let Some(conversation) = store.get(conversation_id) else {
        tracing::warn!("Cannot resume unknown conversation {}", conversation_id);
        return false;
    };

    sender.send(conversation).is_ok()
}
