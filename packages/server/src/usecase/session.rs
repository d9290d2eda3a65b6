//! Per-connection session.
//!
//! A session owns one connection from the moment the transport hands it over
//! until the connection is gone:
//!
//! ```text
//! Connecting → Handshake (text mode only) → Active → Closed
//! ```
//!
//! There are no retries. Any read error, a malformed frame or an external
//! `close()` on the handle ends the session. The handshake read has no timeout:
//! a client that never sends its name parks only its own task.

use std::sync::Arc;

use crate::domain::{
    ConnectionHandle, ConnectionId, ConnectionReader, DisplayName, InboundFrame, OutboundMessage,
    PayloadMode, TransportError,
};

use super::{JoinMemberUseCase, LeaveMemberUseCase, RelayMessageUseCase, RelayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Handshake,
    Active,
    Closed,
}

/// Why a session reached `Closed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Prompt write or name read failed; the member was never registered
    HandshakeFailed(TransportError),
    /// Steady-state read failed or the connection was closed
    Disconnected(TransportError),
    /// Inbound frame could not be relayed
    Rejected(RelayError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub id: ConnectionId,
    pub name: Option<DisplayName>,
    /// Number of inbound frames handed to the dispatcher
    pub relayed: usize,
    pub end: SessionEnd,
}

impl SessionOutcome {
    /// Whether the session ever became visible to other members
    pub fn registered(&self) -> bool {
        !matches!(self.end, SessionEnd::HandshakeFailed(_))
    }
}

pub struct ConnectionSession<R> {
    id: ConnectionId,
    handle: Arc<dyn ConnectionHandle>,
    reader: R,
    join: Arc<JoinMemberUseCase>,
    relay: Arc<RelayMessageUseCase>,
    leave: Arc<LeaveMemberUseCase>,
    state: SessionState,
}

impl<R: ConnectionReader> ConnectionSession<R> {
    pub fn new(
        id: ConnectionId,
        handle: Arc<dyn ConnectionHandle>,
        reader: R,
        join: Arc<JoinMemberUseCase>,
        relay: Arc<RelayMessageUseCase>,
        leave: Arc<LeaveMemberUseCase>,
    ) -> Self {
        Self {
            id,
            handle,
            reader,
            join,
            relay,
            leave,
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session until the connection is gone
    pub async fn run(mut self) -> SessionOutcome {
        let name = match self.relay.mode() {
            PayloadMode::Text => {
                self.transition(SessionState::Handshake);
                match self.handshake().await {
                    Ok(name) => Some(name),
                    Err(e) => {
                        tracing::debug!("Handshake for '{}' aborted: {}", self.id, e);
                        self.transition(SessionState::Closed);
                        self.handle.close().await;
                        return SessionOutcome {
                            id: self.id,
                            name: None,
                            relayed: 0,
                            end: SessionEnd::HandshakeFailed(e),
                        };
                    }
                }
            }
            PayloadMode::Document => None,
        };

        let (relayed, end) = match self
            .join
            .execute(self.id, name.clone(), self.handle.clone())
            .await
        {
            Ok(_) => {
                tracing::info!(
                    "Connection '{}' joined as {}",
                    self.id,
                    name.as_ref().map_or("<unnamed>", |n| n.as_str())
                );
                self.transition(SessionState::Active);
                self.active_loop(name.as_ref()).await
            }
            Err(e) => (0, SessionEnd::Rejected(e.into())),
        };

        self.transition(SessionState::Closed);
        match self.leave.execute(&self.id, name.as_ref()).await {
            Ok(true) => tracing::info!("Connection '{}' left: {:?}", self.id, end),
            Ok(false) => tracing::info!(
                "Connection '{}' left after being pruned by the dispatcher: {:?}",
                self.id,
                end
            ),
            Err(e) => tracing::warn!("Failed to announce departure of '{}': {}", self.id, e),
        }
        self.handle.close().await;

        SessionOutcome {
            id: self.id,
            name,
            relayed,
            end,
        }
    }

    /// Prompt for a name and read exactly one frame as the display name.
    ///
    /// A binary frame is accepted only if it is valid UTF-8, the same rule the
    /// active loop applies to chat lines.
    async fn handshake(&mut self) -> Result<DisplayName, TransportError> {
        self.handle.write_message(&OutboundMessage::prompt()).await?;

        let name = match self.reader.read_message().await? {
            InboundFrame::Text(text) => text,
            InboundFrame::Binary(data) => String::from_utf8(data).map_err(|e| {
                TransportError::ReadFailed(format!("display name is not valid UTF-8: {}", e))
            })?,
        };
        Ok(DisplayName::new(name))
    }

    async fn active_loop(&mut self, name: Option<&DisplayName>) -> (usize, SessionEnd) {
        let mut relayed = 0;
        loop {
            let frame = match self.reader.read_message().await {
                Ok(frame) => frame,
                Err(e) => return (relayed, SessionEnd::Disconnected(e)),
            };

            match self.relay.execute(name, frame).await {
                Ok(()) => relayed += 1,
                Err(e) => {
                    tracing::warn!("Dropping connection '{}': {}", self.id, e);
                    return (relayed, SessionEnd::Rejected(e));
                }
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!("Session '{}': {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }
}
