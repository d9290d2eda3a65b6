//! WebSocket を使った ConnectionHandle / ConnectionReader 実装
//!
//! ## 責務
//!
//! - upgrade 済みの `WebSocket` を送信側（sink）と受信側（stream）に分割
//! - 送信側は Mutex で保護し、セッションとディスパッチャからの書き込みを直列化
//! - `close()` で受信待ちのセッションを起こし、close フレームを送信
//!
//! ## 設計ノート
//!
//! WebSocket の生成（upgrade）は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `WebSocket` を受け取り、ドメイン層の trait に適合させます。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::sync::{Mutex, watch};

use crate::domain::{
    ConnectionHandle, ConnectionReader, InboundFrame, OutboundMessage, TransportError,
};

/// Upper bound for flushing the close frame to an unresponsive peer
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Write side of an upgraded WebSocket, shared via `Arc`.
pub struct WebSocketConnection {
    sink: Mutex<SplitSink<WebSocket, Message>>,
    closed: watch::Sender<bool>,
}

/// Read side of an upgraded WebSocket, owned by its session.
pub struct WebSocketReader {
    stream: SplitStream<WebSocket>,
    closed: watch::Receiver<bool>,
}

/// Split an upgraded socket into a shared handle and an exclusive reader.
pub fn split_socket(socket: WebSocket) -> (Arc<WebSocketConnection>, WebSocketReader) {
    let (sink, stream) = socket.split();
    let (closed_tx, closed_rx) = watch::channel(false);

    let connection = Arc::new(WebSocketConnection {
        sink: Mutex::new(sink),
        closed: closed_tx,
    });
    let reader = WebSocketReader {
        stream,
        closed: closed_rx,
    };

    (connection, reader)
}

impl WebSocketConnection {
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

#[async_trait]
impl ConnectionHandle for WebSocketConnection {
    async fn write_message(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(message.as_str().to_owned().into()))
            .await
            .map_err(|e| TransportError::WriteFailed(e.to_string()))
    }

    async fn close(&self) {
        // Wake the reader first; it must not wait on the sink lock.
        if self.closed.send_replace(true) {
            return;
        }

        let mut sink = self.sink.lock().await;
        match tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await {
            Ok(Ok(())) => tracing::debug!("WebSocket closed"),
            Ok(Err(e)) => tracing::debug!("WebSocket close failed: {}", e),
            Err(_) => tracing::debug!("WebSocket close timed out after {:?}", CLOSE_TIMEOUT),
        }
    }
}

#[async_trait]
impl ConnectionReader for WebSocketReader {
    async fn read_message(&mut self) -> Result<InboundFrame, TransportError> {
        loop {
            if *self.closed.borrow_and_update() {
                return Err(TransportError::Closed);
            }

            tokio::select! {
                changed = self.closed.changed() => {
                    if changed.is_err() {
                        return Err(TransportError::Closed);
                    }
                }
                next = self.stream.next() => match next {
                    Some(Ok(Message::Text(text))) => {
                        return Ok(InboundFrame::Text(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Binary(data))) => {
                        return Ok(InboundFrame::Binary(data.to_vec()));
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        // Ping/pong is handled automatically by the WebSocket protocol
                        tracing::trace!("Received ping/pong");
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        return Err(TransportError::Closed);
                    }
                    Some(Err(e)) => {
                        return Err(TransportError::ReadFailed(e.to_string()));
                    }
                },
            }
        }
    }
}
