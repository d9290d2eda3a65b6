//! Broadcast queue and dispatcher.
//!
//! Sessions push [`OutboundMessage`](crate::domain::OutboundMessage)s into a
//! [`DispatchQueue`]; a single [`BroadcastDispatcher`] drains it in FIFO order
//! and fans every message out to a fresh registry snapshot, pruning members
//! whose write fails.

mod broadcast;
mod queue;

use std::{sync::Arc, time::Duration};

use crate::domain::MemberRegistry;

pub use broadcast::{BroadcastDispatcher, FanOutReport};
pub use queue::DispatchQueue;

/// Default upper bound for a single write during fan-out
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Dispatcher tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// `None` keeps the queue unbounded. `Some(n)` applies backpressure to
    /// producers once `n` messages are waiting.
    pub queue_capacity: Option<usize>,
    /// A write that takes longer than this counts as failed
    pub write_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: None,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// Create a connected queue/dispatcher pair.
///
/// The dispatcher stops once every clone of the returned queue is dropped.
pub fn dispatch_channel(
    registry: Arc<dyn MemberRegistry>,
    config: DispatcherConfig,
) -> (DispatchQueue, BroadcastDispatcher) {
    let (queue, receiver) = DispatchQueue::new(config.queue_capacity);
    let dispatcher = BroadcastDispatcher::new(registry, receiver, config.write_timeout);
    (queue, dispatcher)
}
