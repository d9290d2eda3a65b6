//! Outbound messages and payload modes.

use std::{fmt, str::FromStr, sync::Arc};

use thiserror::Error;

use super::DisplayName;

/// Prompt written to a new connection before its name is read
pub const NAME_PROMPT: &str = "Enter your name:";

/// A message handed to the dispatcher for fan-out.
///
/// Immutable once built. Cloning only bumps a reference count, so the same
/// payload is shared by every write of one fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Plain text line
    Text(Arc<str>),
    /// Schemaless JSON document, relayed byte-for-byte
    Document(Arc<str>),
}

impl OutboundMessage {
    pub fn prompt() -> Self {
        Self::Text(Arc::from(NAME_PROMPT))
    }

    pub fn joined(name: &DisplayName) -> Self {
        Self::Text(format!("{name} has joined the chat").into())
    }

    pub fn left(name: &DisplayName) -> Self {
        Self::Text(format!("{name} has left the chat").into())
    }

    pub fn chat(name: &DisplayName, body: &str) -> Self {
        Self::Text(format!("{name}: {body}").into())
    }

    /// Wrap an already well-formed JSON document
    pub fn document(raw: impl Into<Arc<str>>) -> Self {
        Self::Document(raw.into())
    }

    /// Payload as it goes on the wire
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Document(raw) => raw,
        }
    }
}

/// Payload shape of a deployment. Picked once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadMode {
    /// Named members, handshake, join/leave notices, `"<name>: <body>"` lines
    #[default]
    Text,
    /// Unnamed members, no handshake, JSON documents relayed verbatim
    Document,
}

impl PayloadMode {
    pub fn uses_handshake(self) -> bool {
        matches!(self, Self::Text)
    }
}

impl fmt::Display for PayloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Document => f.write_str("document"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown payload mode '{0}' (expected 'text' or 'document')")]
pub struct ParsePayloadModeError(String);

impl FromStr for PayloadMode {
    type Err = ParsePayloadModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "document" | "json" => Ok(Self::Document),
            _ => Err(ParsePayloadModeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> DisplayName {
        DisplayName::new("Alice".to_string())
    }

    #[test]
    fn test_text_notices_follow_chat_conventions() {
        // テスト項目: 参加・退出・チャットのテキストが既定の書式で生成される
        // given (前提条件):
        let name = alice();

        // when (操作):
        let joined = OutboundMessage::joined(&name);
        let left = OutboundMessage::left(&name);
        let chat = OutboundMessage::chat(&name, "hi");

        // then (期待する結果):
        assert_eq!(joined.as_str(), "Alice has joined the chat");
        assert_eq!(left.as_str(), "Alice has left the chat");
        assert_eq!(chat.as_str(), "Alice: hi");
        assert_eq!(OutboundMessage::prompt().as_str(), "Enter your name:");
    }

    #[test]
    fn test_document_is_kept_verbatim() {
        // テスト項目: ドキュメントはバイト列を変更せずに保持される
        // given (前提条件):
        let raw = r#"{ "b": 1,  "a": [true, null] }"#;

        // when (操作):
        let message = OutboundMessage::document(raw);

        // then (期待する結果):
        assert!(matches!(message, OutboundMessage::Document(_)));
        assert_eq!(message.as_str(), raw);
    }

    #[test]
    fn test_clone_shares_payload() {
        // テスト項目: clone はペイロードを共有する
        // given (前提条件):
        let message = OutboundMessage::chat(&alice(), "shared");

        // when (操作):
        let cloned = message.clone();

        // then (期待する結果):
        match (&message, &cloned) {
            (OutboundMessage::Text(a), OutboundMessage::Text(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected text messages"),
        }
    }

    #[test]
    fn test_payload_mode_parsing() {
        // テスト項目: PayloadMode が文字列から解釈できる
        // given (前提条件):

        // when (操作):

        // then (期待する結果):
        assert_eq!("text".parse::<PayloadMode>(), Ok(PayloadMode::Text));
        assert_eq!("Document".parse::<PayloadMode>(), Ok(PayloadMode::Document));
        assert_eq!("json".parse::<PayloadMode>(), Ok(PayloadMode::Document));
        assert!("xml".parse::<PayloadMode>().is_err());
    }

    #[test]
    fn test_only_text_mode_uses_handshake() {
        // テスト項目: ハンドシェイクはテキストモードでのみ行われる
        // given (前提条件):

        // when (操作):

        // then (期待する結果):
        assert!(PayloadMode::Text.uses_handshake());
        assert!(!PayloadMode::Document.uses_handshake());
        assert_eq!(PayloadMode::default(), PayloadMode::Text);
    }
}
