//! UseCase: メッセージ中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() メソッド
//! - 受信フレームから OutboundMessage への変換（PayloadMode ごと）
//!
//! ### どのような状況を想定しているか
//! - 正常系：テキストモードで `"<name>: <body>"` に整形される
//! - 正常系：ドキュメントモードで JSON がそのまま中継される
//! - 異常系：UTF-8 でないバイナリ、壊れた JSON

use std::sync::Arc;

use serde::de::IgnoredAny;

use crate::domain::{DisplayName, InboundFrame, OutboundMessage, OutboundQueue, PayloadMode};

use super::error::RelayError;

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    queue: Arc<dyn OutboundQueue>,
    mode: PayloadMode,
}

impl RelayMessageUseCase {
    pub fn new(queue: Arc<dyn OutboundQueue>, mode: PayloadMode) -> Self {
        Self { queue, mode }
    }

    pub fn mode(&self) -> PayloadMode {
        self.mode
    }

    /// Turn one inbound frame into an outbound message and queue it.
    ///
    /// # Errors
    ///
    /// A decode error means the frame was malformed for this deployment's
    /// payload mode. Nothing is queued in that case.
    pub async fn execute(
        &self,
        sender: Option<&DisplayName>,
        frame: InboundFrame,
    ) -> Result<(), RelayError> {
        let message = decode(self.mode, sender, frame)?;
        self.queue.enqueue(message).await?;
        Ok(())
    }
}

fn decode(
    mode: PayloadMode,
    sender: Option<&DisplayName>,
    frame: InboundFrame,
) -> Result<OutboundMessage, RelayError> {
    let payload = match frame {
        InboundFrame::Text(text) => text,
        InboundFrame::Binary(data) => String::from_utf8(data).map_err(|_| RelayError::InvalidUtf8)?,
    };

    match mode {
        PayloadMode::Text => Ok(match sender {
            Some(name) => OutboundMessage::chat(name, &payload),
            None => OutboundMessage::Text(payload.into()),
        }),
        PayloadMode::Document => {
            // Well-formedness only; the document is never inspected.
            serde_json::from_str::<IgnoredAny>(&payload)
                .map_err(|e| RelayError::MalformedDocument(e.to_string()))?;
            Ok(OutboundMessage::document(payload))
        }
    }
}
