//! Assistant responders and the delayed reply task
//!
//! A [`Responder`] turns a user prompt into an assistant message. Replies are
//! produced on a spawned task after a fixed delay; the task is bound to a
//! [`CancellationToken`] so tearing down the chat view stops it before it can
//! deliver anything.

use crate::error::Result;
use crate::storage::Message;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Produces assistant replies
///
/// # Examples
///
/// ```
/// use schoolfinder::responder::Responder;
/// use schoolfinder::storage::Message;
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Responder for Echo {
///     async fn respond(
///         &self,
///         _history: &[Message],
///         prompt: &str,
///     ) -> schoolfinder::error::Result<Message> {
///         Ok(Message::assistant(prompt))
///     }
/// }
/// ```
#[async_trait]
pub trait Responder: Send + Sync {
    /// Reply to `prompt`, given the conversation so far
    async fn respond(&self, history: &[Message], prompt: &str) -> Result<Message>;
}

/// Responder that always answers with the same text
#[derive(Debug, Clone)]
pub struct FixedResponder {
    reply: String,
}

impl FixedResponder {
    /// Create a responder answering with `reply`
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl Responder for FixedResponder {
    async fn respond(&self, _history: &[Message], _prompt: &str) -> Result<Message> {
        Ok(Message::assistant(self.reply.clone()))
    }
}

/// How a reply task ended
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// The responder produced a message
    Delivered(Message),
    /// The responder failed or the task panicked
    Failed,
    /// The reply was cancelled, possibly after it was produced
    Cancelled,
}

impl ReplyOutcome {
    /// The delivered message, if any
    pub fn into_message(self) -> Option<Message> {
        match self {
            Self::Delivered(message) => Some(message),
            Self::Failed | Self::Cancelled => None,
        }
    }
}

/// An assistant reply still in flight
///
/// Dropping the handle cancels the reply.
pub struct PendingReply {
    handle: JoinHandle<Option<Message>>,
    cancellation: CancellationToken,
}

impl PendingReply {
    /// Cancel the reply; a cancelled reply resolves to `None`
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Whether the reply was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Token governing this reply
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Wait for the task and report how it ended
    ///
    /// Cancellation is read before the handle is dropped, since dropping it
    /// cancels the token.
    pub async fn outcome(mut self) -> ReplyOutcome {
        let reply = match (&mut self.handle).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Reply task failed: {}", e);
                None
            }
        };

        if self.cancellation.is_cancelled() {
            return ReplyOutcome::Cancelled;
        }
        match reply {
            Some(message) => ReplyOutcome::Delivered(message),
            None => ReplyOutcome::Failed,
        }
    }

    /// Wait for the reply
    ///
    /// Returns `None` if the reply was cancelled (even after it was
    /// produced), the responder failed, or the task panicked.
    pub async fn wait(self) -> Option<Message> {
        self.outcome().await.into_message()
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

/// Spawn a reply to `prompt` that is delivered after `delay`
///
/// The reply is abandoned as soon as `cancellation` fires.
pub fn spawn_reply(
    responder: Arc<dyn Responder>,
    history: Vec<Message>,
    prompt: String,
    delay: Duration,
    cancellation: CancellationToken,
) -> PendingReply {
    let token = cancellation.clone();
    let handle = tokio::spawn(async move {
        tokio::select! {
            biased;

            _ = token.cancelled() => {
                tracing::debug!("Reply cancelled before delivery");
                None
            }

            reply = async {
                tokio::time::sleep(delay).await;
                responder.respond(&history, &prompt).await
            } => match reply {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!("Responder failed: {:#}", e);
                    None
                }
            }
        }
    });

    PendingReply {
        handle,
        cancellation,
    }
}
