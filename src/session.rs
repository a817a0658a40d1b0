//! Working state of the assistant chat view
//!
//! A session starts with a welcome message and saves itself after every
//! change once a real exchange exists: the first save creates the stored
//! conversation, later saves update it. Assistant replies run as cancellable
//! tasks; closing or dropping the session cancels any reply still in flight.

use crate::responder::{spawn_reply, PendingReply, ReplyOutcome, Responder};
use crate::storage::{Conversation, ConversationStore, KeyValueStore, Message};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Session tunables
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Assistant message every new conversation starts with
    pub welcome_message: String,
    /// Simulated delay before a reply is delivered
    pub response_delay: Duration,
}

impl SessionSettings {
    /// Settings from the chat section of the configuration
    pub fn from_config(config: &crate::config::ChatConfig) -> Self {
        Self {
            welcome_message: config.welcome_message.clone(),
            response_delay: Duration::from_millis(config.response_delay_ms),
        }
    }
}

/// An interactive conversation bound to a store and a responder
pub struct ChatSession<S: KeyValueStore> {
    store: Arc<ConversationStore<S>>,
    responder: Arc<dyn Responder>,
    settings: SessionSettings,
    messages: Vec<Message>,
    conversation_id: Option<String>,
    awaiting_reply: bool,
    cancellation: CancellationToken,
}

impl<S: KeyValueStore> ChatSession<S> {
    /// Start a fresh conversation
    pub fn new(
        store: Arc<ConversationStore<S>>,
        responder: Arc<dyn Responder>,
        settings: SessionSettings,
    ) -> Self {
        let messages = vec![Message::assistant(settings.welcome_message.clone())];
        Self {
            store,
            responder,
            settings,
            messages,
            conversation_id: None,
            awaiting_reply: false,
            cancellation: CancellationToken::new(),
        }
    }

    /// Messages of the working conversation
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Id of the stored conversation, once saved
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Whether a reply is in flight
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Submit a user message and start the assistant reply
    ///
    /// Returns `None` for blank input or while another reply is in flight.
    pub fn send(&mut self, text: &str) -> Option<PendingReply> {
        let text = text.trim();
        if text.is_empty() || self.awaiting_reply {
            return None;
        }

        let history = self.messages.clone();
        self.messages.push(Message::user(text).as_question());
        self.autosave();

        self.awaiting_reply = true;
        Some(spawn_reply(
            Arc::clone(&self.responder),
            history,
            text.to_string(),
            self.settings.response_delay,
            self.cancellation.child_token(),
        ))
    }

    /// Wait for `pending` and apply the reply
    ///
    /// Returns `None` if the reply was cancelled (by [`close`](Self::close),
    /// [`reset`](Self::reset) or [`resume`](Self::resume)) or produced nothing.
    pub async fn receive(&mut self, pending: PendingReply) -> Option<Message> {
        let reply = match pending.outcome().await {
            ReplyOutcome::Cancelled => return None,
            ReplyOutcome::Failed => {
                self.awaiting_reply = false;
                return None;
            }
            ReplyOutcome::Delivered(reply) => reply,
        };

        self.awaiting_reply = false;
        self.messages.push(reply.clone());
        self.autosave();
        Some(reply)
    }

    /// Submit a user message and wait for the reply
    pub async fn ask(&mut self, text: &str) -> Option<Message> {
        let pending = self.send(text)?;
        self.receive(pending).await
    }

    /// Adopt a saved conversation as the working state
    ///
    /// Later messages update that stored conversation.
    pub fn resume(&mut self, conversation: Conversation) {
        self.cancel_in_flight();
        tracing::info!("Resuming conversation {}", conversation.id);
        self.messages = conversation.messages;
        self.conversation_id = Some(conversation.id);
    }

    /// Start over with only the welcome message
    pub fn reset(&mut self) {
        self.cancel_in_flight();
        self.messages = vec![Message::assistant(self.settings.welcome_message.clone())];
        self.conversation_id = None;
    }

    /// Abandon the reply in flight, keeping the conversation as it is
    pub fn cancel_reply(&mut self) {
        if self.awaiting_reply {
            tracing::debug!("Reply abandoned by user");
        }
        self.cancel_in_flight();
    }

    /// Tear down the session, cancelling any reply in flight
    pub fn close(&mut self) {
        self.cancellation.cancel();
        self.awaiting_reply = false;
    }

    fn cancel_in_flight(&mut self) {
        self.cancellation.cancel();
        self.cancellation = CancellationToken::new();
        self.awaiting_reply = false;
    }

    fn autosave(&mut self) {
        if self.messages.len() <= 1 {
            return;
        }

        match &self.conversation_id {
            Some(id) => self.store.update(id, &self.messages),
            None => {
                if let Some(id) = self.store.create(&self.messages) {
                    self.conversation_id = Some(id);
                }
            }
        }
    }
}

impl<S: KeyValueStore> Drop for ChatSession<S> {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
