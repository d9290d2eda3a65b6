//! Domain error types.

use thiserror::Error;

/// Errors raised by a connection's transport primitives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection was closed by the peer or by a local `close()`
    #[error("connection closed")]
    Closed,

    /// Reading the next frame failed
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// Writing a frame failed
    #[error("write failed: {0}")]
    WriteFailed(String),
}

/// Errors raised when handing a message to the outbound queue.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The dispatcher has stopped and no longer drains the queue
    #[error("dispatcher has stopped")]
    Closed,
}
