//! Domain layer
//!
//! 値オブジェクト（ConnectionId, DisplayName, Timestamp）、メッセージ、
//! およびトランスポート・レジストリ・キューの境界となる trait を定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

mod connection;
mod error;
mod member;
mod message;
mod queue;
mod registry;

pub use connection::{ConnectionHandle, ConnectionId, ConnectionReader, InboundFrame};
pub use error::{QueueError, TransportError};
pub use member::{DisplayName, Member, Timestamp};
pub use message::{NAME_PROMPT, OutboundMessage, ParsePayloadModeError, PayloadMode};
pub use queue::OutboundQueue;
pub use registry::MemberRegistry;

#[cfg(test)]
pub use connection::MockConnectionHandle;
