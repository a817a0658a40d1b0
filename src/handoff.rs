//! One-shot hand-off of a saved conversation to the chat view
//!
//! The history view picks a conversation and sends it; the chat view takes
//! it at most once and adopts it as its working state.

use crate::storage::Conversation;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Sending half, consumed by a single send
#[derive(Debug)]
pub struct ResumeSender {
    inner: oneshot::Sender<Conversation>,
}

/// Receiving half, yields the conversation at most once
#[derive(Debug)]
pub struct ResumeReceiver {
    inner: Option<oneshot::Receiver<Conversation>>,
}

/// Create a resume hand-off pair
///
/// # Examples
///
/// ```
/// use schoolfinder::handoff::resume_channel;
/// use schoolfinder::storage::Conversation;
///
/// let (tx, mut rx) = resume_channel();
/// assert!(rx.take().is_none());
///
/// let conversation = Conversation {
///     id: "conv_1_abc".to_string(),
///     title: "New Conversation".to_string(),
///     messages: vec![],
///     last_updated: chrono::Utc::now(),
///     preview: "No response yet".to_string(),
/// };
/// tx.send(conversation).unwrap();
/// assert!(rx.take().is_some());
/// assert!(rx.take().is_none());
/// ```
pub fn resume_channel() -> (ResumeSender, ResumeReceiver) {
    let (tx, rx) = oneshot::channel();
    (
        ResumeSender { inner: tx },
        ResumeReceiver { inner: Some(rx) },
    )
}

impl ResumeSender {
    /// Hand `conversation` to the chat view
    ///
    /// Gives the conversation back if the receiver is gone.
    pub fn send(self, conversation: Conversation) -> Result<(), Box<Conversation>> {
        tracing::debug!("Handing off conversation {} for resume", conversation.id);
        self.inner.send(conversation).map_err(Box::new)
    }
}

impl ResumeReceiver {
    /// Take the handed-off conversation without waiting
    pub fn take(&mut self) -> Option<Conversation> {
        let mut rx = self.inner.take()?;
        match rx.try_recv() {
            Ok(conversation) => Some(conversation),
            Err(TryRecvError::Empty) => {
                self.inner = Some(rx);
                None
            }
            Err(TryRecvError::Closed) => None,
        }
    }

    /// Wait for the handed-off conversation
    ///
    /// Resolves to `None` if the sender is dropped without sending or the
    /// conversation was already taken.
    pub async fn recv(mut self) -> Option<Conversation> {
        let rx = self.inner.take()?;
        rx.await.ok()
    }

    /// Whether a conversation may still arrive
    pub fn is_pending(&self) -> bool {
        self.inner.is_some()
    }
}
