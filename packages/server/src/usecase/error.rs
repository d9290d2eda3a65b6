//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::QueueError;

/// Inbound frame could not be turned into an outbound message
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Binary frame in text mode that is not UTF-8
    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    /// Frame in document mode that is not well-formed JSON
    #[error("frame is not a JSON document: {0}")]
    MalformedDocument(String),

    #[error(transparent)]
    Queue(#[from] QueueError),
}
