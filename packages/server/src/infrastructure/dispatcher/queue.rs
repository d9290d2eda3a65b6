//! Producer/consumer ends of the broadcast queue.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{OutboundMessage, OutboundQueue, QueueError};

/// Clonable producer handle of the broadcast queue.
#[derive(Clone)]
pub struct DispatchQueue {
    sender: QueueSender,
}

#[derive(Clone)]
enum QueueSender {
    Unbounded(mpsc::UnboundedSender<OutboundMessage>),
    Bounded(mpsc::Sender<OutboundMessage>),
}

/// Consumer end, owned by the dispatcher.
pub(super) enum QueueReceiver {
    Unbounded(mpsc::UnboundedReceiver<OutboundMessage>),
    Bounded(mpsc::Receiver<OutboundMessage>),
}

impl DispatchQueue {
    pub(super) fn new(capacity: Option<usize>) -> (Self, QueueReceiver) {
        match capacity {
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                (
                    Self {
                        sender: QueueSender::Unbounded(tx),
                    },
                    QueueReceiver::Unbounded(rx),
                )
            }
            Some(capacity) => {
                // tokio rejects zero-capacity channels
                let (tx, rx) = mpsc::channel(capacity.max(1));
                (
                    Self {
                        sender: QueueSender::Bounded(tx),
                    },
                    QueueReceiver::Bounded(rx),
                )
            }
        }
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self.sender, QueueSender::Bounded(_))
    }
}

#[async_trait]
impl OutboundQueue for DispatchQueue {
    async fn enqueue(&self, message: OutboundMessage) -> Result<(), QueueError> {
        match &self.sender {
            QueueSender::Unbounded(tx) => tx.send(message).map_err(|_| QueueError::Closed),
            QueueSender::Bounded(tx) => tx.send(message).await.map_err(|_| QueueError::Closed),
        }
    }
}

impl QueueReceiver {
    /// Wait for the next message. `None` once every producer is gone.
    pub(super) async fn recv(&mut self) -> Option<OutboundMessage> {
        match self {
            Self::Unbounded(rx) => rx.recv().await,
            Self::Bounded(rx) => rx.recv().await,
        }
    }
}
