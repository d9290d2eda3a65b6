//! Connection identity and the transport seam.
//!
//! The core never touches sockets directly. A transport adapter hands it a
//! [`ConnectionHandle`] (shared between the owning session and the dispatcher)
//! and a [`ConnectionReader`] (owned exclusively by the session).

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use super::{OutboundMessage, TransportError};

/// Opaque identifier of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh identifier for a newly accepted connection
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ConnectionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One decoded inbound unit. Control frames never surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// Write side of a connection.
///
/// Writes from different tasks to the same handle must not interleave
/// within a frame; implementations serialize them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionHandle: Send + Sync {
    /// Write one message as a single transport frame
    async fn write_message(&self, message: &OutboundMessage) -> Result<(), TransportError>;

    /// Terminate the connection.
    ///
    /// Best-effort and idempotent. Any pending or later `read_message` on the
    /// paired reader returns [`TransportError::Closed`].
    async fn close(&self);
}

/// Read side of a connection.
#[async_trait]
pub trait ConnectionReader: Send {
    /// Wait for the next inbound frame
    async fn read_message(&mut self) -> Result<InboundFrame, TransportError>;
}
