use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person searching for schools
    User,
    /// The automated responder
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn in a conversation
///
/// The persisted form keeps the role under `type` and the creation time
/// under `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Caller-generated unique identifier
    pub id: String,
    /// Who authored the message
    #[serde(rename = "type")]
    pub role: Role,
    /// Message text
    pub content: String,
    /// When the message was created
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Opaque school result records attached to an assistant answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_results: Option<Vec<serde_json::Value>>,
    /// Whether the user message was asked as a question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_question: Option<bool>,
}

impl Message {
    /// Build a message with a fresh id and the current time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            school_results: None,
            is_question: None,
        }
    }

    /// Build a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Build an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Mark the message as a question
    pub fn as_question(mut self) -> Self {
        self.is_question = Some(true);
        self
    }

    /// Attach school result records
    pub fn with_school_results(mut self, results: Vec<serde_json::Value>) -> Self {
        self.school_results = Some(results);
        self
    }

    /// Returns true if the message was written by the user
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Returns true if the message was written by the assistant
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// A persisted conversation with derived title and preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Store-generated unique identifier
    pub id: String,
    /// Derived once from the first user message
    pub title: String,
    /// Ordered messages
    pub messages: Vec<Message>,
    /// Time of the last create or update
    pub last_updated: DateTime<Utc>,
    /// Derived from the governing assistant message
    pub preview: String,
}

impl Conversation {
    /// Number of messages in the conversation
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}
