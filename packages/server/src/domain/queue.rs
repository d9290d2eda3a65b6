//! Outbound queue seam.

use async_trait::async_trait;

use super::{OutboundMessage, QueueError};

/// Producer side of the broadcast queue.
///
/// Sessions hand every outbound message to this queue; the dispatcher drains
/// it in FIFO order.
#[async_trait]
pub trait OutboundQueue: Send + Sync {
    /// Enqueue a message for fan-out.
    ///
    /// Returns immediately on an unbounded queue. On a bounded queue the caller
    /// is suspended until capacity frees up; messages are never dropped.
    async fn enqueue(&self, message: OutboundMessage) -> Result<(), QueueError>;
}
