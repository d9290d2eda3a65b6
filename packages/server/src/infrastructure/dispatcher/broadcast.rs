//! Sequential fan-out worker.

use std::{sync::Arc, time::Duration};

use futures_util::future::join_all;

use crate::domain::{Member, MemberRegistry, OutboundMessage, TransportError};

use super::queue::QueueReceiver;

/// Outcome of one fan-out pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    pub delivered: usize,
    pub pruned: usize,
}

/// Drains the broadcast queue and delivers each message to every member.
///
/// Exactly one dispatcher exists per queue and it never runs two fan-outs at
/// once: the next message is dequeued only after every write of the current
/// one has finished or timed out. Messages from one sender therefore reach
/// every surviving member in the order they were enqueued.
pub struct BroadcastDispatcher {
    registry: Arc<dyn MemberRegistry>,
    receiver: QueueReceiver,
    write_timeout: Duration,
}

impl BroadcastDispatcher {
    pub(super) fn new(
        registry: Arc<dyn MemberRegistry>,
        receiver: QueueReceiver,
        write_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            receiver,
            write_timeout,
        }
    }

    /// Run until every queue handle has been dropped
    pub async fn run(mut self) {
        tracing::info!(
            "Broadcast dispatcher started (write timeout: {:?})",
            self.write_timeout
        );

        while let Some(message) = self.receiver.recv().await {
            let report = self.broadcast(&message).await;
            tracing::debug!(
                "Fan-out complete: delivered to {}, pruned {}",
                report.delivered,
                report.pruned
            );
        }

        tracing::info!("Broadcast dispatcher stopped: all queue handles dropped");
    }

    async fn broadcast(&self, message: &OutboundMessage) -> FanOutReport {
        let members = self.registry.snapshot().await;
        let mut report = FanOutReport::default();
        if members.is_empty() {
            tracing::debug!("No members connected, message dropped after dequeue");
            return report;
        }

        let results = join_all(members.iter().map(|member| self.deliver(member, message))).await;

        let mut failed = Vec::new();
        for (member, result) in members.iter().zip(results) {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!("Failed to deliver to member '{}': {}", member.id, e);
                    failed.push(member);
                }
            }
        }

        // Closing an unresponsive peer can take a while; prune them all at once.
        report.pruned = failed.len();
        join_all(failed.into_iter().map(|member| self.prune(member))).await;

        report
    }

    async fn prune(&self, member: &Member) {
        if self.registry.remove(&member.id).await {
            tracing::info!("Member '{}' pruned from registry", member.id);
        }
        member.handle.close().await;
    }

    async fn deliver(&self, member: &Member, message: &OutboundMessage) -> Result<(), TransportError> {
        match tokio::time::timeout(self.write_timeout, member.handle.write_message(message)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::WriteFailed(format!(
                "timed out after {:?}",
                self.write_timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        domain::{
            ConnectionHandle, ConnectionId, DisplayName, MockConnectionHandle, OutboundQueue,
            QueueError, Timestamp,
        },
        infrastructure::{
            dispatcher::{DispatchQueue, DispatcherConfig, dispatch_channel},
            registry::InMemoryMemberRegistry,
        },
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 全メンバーへの配信（各メンバーにちょうど 1 回）
    // - 書き込み失敗・タイムアウト時のクローズとレジストリからの削除
    // - 同一送信者のメッセージ順序（FIFO）
    // - メンバー 0 人でも enqueue が成功すること
    // - 有界キューのバックプレッシャー
    // - 応答しないメンバーの削除が並行して行われること
    // ========================================

    /// Handle that forwards every written payload to a channel
    struct RecordingHandle {
        tx: mpsc::UnboundedSender<String>,
        closed: Mutex<bool>,
    }

    impl RecordingHandle {
        fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                Arc::new(Self {
                    tx,
                    closed: Mutex::new(false),
                }),
                rx,
            )
        }

        fn is_closed(&self) -> bool {
            *self.closed.lock().unwrap()
        }
    }

    #[async_trait]
    impl ConnectionHandle for RecordingHandle {
        async fn write_message(&self, message: &OutboundMessage) -> Result<(), TransportError> {
            self.tx
                .send(message.as_str().to_string())
                .map_err(|e| TransportError::WriteFailed(e.to_string()))
        }

        async fn close(&self) {
            *self.closed.lock().unwrap() = true;
        }
    }

    /// Handle whose writes never complete
    struct StalledHandle;

    #[async_trait]
    impl ConnectionHandle for StalledHandle {
        async fn write_message(&self, _message: &OutboundMessage) -> Result<(), TransportError> {
            std::future::pending().await
        }

        async fn close(&self) {}
    }

    fn member(id: ConnectionId, name: &str, handle: Arc<dyn ConnectionHandle>) -> Member {
        Member::new(
            id,
            Some(DisplayName::new(name.to_string())),
            Timestamp::new(0),
            handle,
        )
    }

    fn setup(
        config: DispatcherConfig,
    ) -> (Arc<InMemoryMemberRegistry>, DispatchQueue, BroadcastDispatcher) {
        let registry = Arc::new(InMemoryMemberRegistry::new());
        let (queue, dispatcher) = dispatch_channel(registry.clone(), config);
        (registry, queue, dispatcher)
    }

    fn text(value: &str) -> OutboundMessage {
        OutboundMessage::Text(value.into())
    }

    #[tokio::test]
    async fn test_broadcast_with_no_members() {
        // テスト項目: メンバーが 0 人でも enqueue は成功し、配信は何もしない
        // given (前提条件):
        let (_registry, queue, dispatcher) = setup(DispatcherConfig::default());

        // when (操作):
        let enqueued = queue.enqueue(text("hello?")).await;
        let report = dispatcher.broadcast(&text("hello?")).await;

        // then (期待する結果):
        assert_eq!(enqueued, Ok(()));
        assert_eq!(report, FanOutReport::default());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_member_once() {
        // テスト項目: 登録済みの全メンバーにメッセージがちょうど 1 回届く
        // given (前提条件):
        let (registry, _queue, dispatcher) = setup(DispatcherConfig::default());
        let (alice_handle, mut alice_rx) = RecordingHandle::new();
        let (bob_handle, mut bob_rx) = RecordingHandle::new();
        registry
            .add(member(ConnectionId::generate(), "Alice", alice_handle))
            .await;
        registry
            .add(member(ConnectionId::generate(), "Bob", bob_handle))
            .await;

        // when (操作):
        let report = dispatcher.broadcast(&text("Alice: hi")).await;

        // then (期待する結果):
        assert_eq!(report, FanOutReport { delivered: 2, pruned: 0 });
        assert_eq!(alice_rx.recv().await.as_deref(), Some("Alice: hi"));
        assert_eq!(bob_rx.recv().await.as_deref(), Some("Alice: hi"));
        assert!(alice_rx.try_recv().is_err());
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_write_closes_and_prunes_member() {
        // テスト項目: 書き込みに失敗したメンバーはクローズされ、レジストリから削除される
        // given (前提条件):
        let (registry, _queue, dispatcher) = setup(DispatcherConfig::default());
        let (alice_handle, mut alice_rx) = RecordingHandle::new();
        let alice = ConnectionId::generate();
        registry.add(member(alice, "Alice", alice_handle)).await;

        let mut broken = MockConnectionHandle::new();
        broken
            .expect_write_message()
            .times(1)
            .returning(|_| Err(TransportError::WriteFailed("broken pipe".to_string())));
        broken.expect_close().times(1).returning(|| ());
        let bob = ConnectionId::generate();
        registry.add(member(bob, "Bob", Arc::new(broken))).await;

        // when (操作):
        let first = dispatcher.broadcast(&text("first")).await;
        let second = dispatcher.broadcast(&text("second")).await;

        // then (期待する結果):
        assert_eq!(first, FanOutReport { delivered: 1, pruned: 1 });
        assert_eq!(second, FanOutReport { delivered: 1, pruned: 0 });
        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, alice);
        assert_eq!(alice_rx.recv().await.as_deref(), Some("first"));
        assert_eq!(alice_rx.recv().await.as_deref(), Some("second"));
    }

    /// Handle whose owning session deregisters it while the write is failing
    struct RacingHandle {
        registry: Arc<InMemoryMemberRegistry>,
        id: ConnectionId,
    }

    #[async_trait]
    impl ConnectionHandle for RacingHandle {
        async fn write_message(&self, _message: &OutboundMessage) -> Result<(), TransportError> {
            self.registry.remove(&self.id).await;
            Err(TransportError::Closed)
        }

        async fn close(&self) {}
    }

    #[tokio::test]
    async fn test_pruning_tolerates_member_already_removed() {
        // テスト項目: セッション側で先に削除されたメンバーの削除も安全に行われる
        // given (前提条件):
        let (registry, _queue, dispatcher) = setup(DispatcherConfig::default());
        let id = ConnectionId::generate();
        let handle = Arc::new(RacingHandle {
            registry: registry.clone(),
            id,
        });
        registry.add(member(id, "Alice", handle)).await;

        // when (操作):
        let report = dispatcher.broadcast(&text("late")).await;

        // then (期待する結果):
        assert_eq!(report, FanOutReport { delivered: 0, pruned: 1 });
        assert_eq!(registry.count().await, 0);
        assert!(!registry.remove(&id).await);
    }

    #[tokio::test]
    async fn test_write_timeout_prunes_slow_member() {
        // テスト項目: 書き込みがタイムアウトしたメンバーは削除され、他のメンバーには配信される
        // given (前提条件):
        let (registry, _queue, dispatcher) = setup(DispatcherConfig {
            queue_capacity: None,
            write_timeout: Duration::from_millis(50),
        });
        let (alice_handle, mut alice_rx) = RecordingHandle::new();
        let alice = ConnectionId::generate();
        registry.add(member(alice, "Alice", alice_handle)).await;
        registry
            .add(member(ConnectionId::generate(), "Slow", Arc::new(StalledHandle)))
            .await;

        // when (操作):
        let report = dispatcher.broadcast(&text("tick")).await;

        // then (期待する結果):
        assert_eq!(report, FanOutReport { delivered: 1, pruned: 1 });
        assert_eq!(alice_rx.recv().await.as_deref(), Some("tick"));
        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, alice);
    }

    #[tokio::test]
    async fn test_closed_handle_is_marked_on_failure() {
        // テスト項目: 書き込み失敗時にハンドルの close が呼ばれる
        // given (前提条件):
        let (registry, _queue, dispatcher) = setup(DispatcherConfig::default());
        let (handle, rx) = RecordingHandle::new();
        registry
            .add(member(ConnectionId::generate(), "Alice", handle.clone()))
            .await;
        drop(rx);

        // when (操作):
        let report = dispatcher.broadcast(&text("gone")).await;

        // then (期待する結果):
        assert_eq!(report, FanOutReport { delivered: 0, pruned: 1 });
        assert!(handle.is_closed());
    }

    /// Handle whose writes never complete and whose close flushes slowly
    struct UnresponsivePeer {
        close_delay: Duration,
    }

    #[async_trait]
    impl ConnectionHandle for UnresponsivePeer {
        async fn write_message(&self, _message: &OutboundMessage) -> Result<(), TransportError> {
            std::future::pending().await
        }

        async fn close(&self) {
            tokio::time::sleep(self.close_delay).await;
        }
    }

    #[tokio::test]
    async fn test_slow_closes_do_not_add_up() {
        // テスト項目: 複数の応答しないメンバーを削除しても、close の待ち時間が積み重ならない
        // given (前提条件):
        let write_timeout = Duration::from_millis(100);
        let close_delay = Duration::from_millis(200);
        let (registry, _queue, dispatcher) = setup(DispatcherConfig {
            queue_capacity: None,
            write_timeout,
        });
        let (alice_handle, mut alice_rx) = RecordingHandle::new();
        registry
            .add(member(ConnectionId::generate(), "Alice", alice_handle))
            .await;
        for i in 0..5 {
            registry
                .add(member(
                    ConnectionId::generate(),
                    &format!("Idle{i}"),
                    Arc::new(UnresponsivePeer { close_delay }),
                ))
                .await;
        }

        // when (操作):
        let started = tokio::time::Instant::now();
        let report = dispatcher.broadcast(&text("tick")).await;
        let elapsed = started.elapsed();

        // then (期待する結果):
        assert_eq!(report, FanOutReport { delivered: 1, pruned: 5 });
        assert!(
            elapsed < write_timeout + close_delay * 2,
            "fan-out took {:?}",
            elapsed
        );
        assert_eq!(alice_rx.recv().await.as_deref(), Some("tick"));
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_run_preserves_enqueue_order() {
        // テスト項目: 同一送信者のメッセージは enqueue した順に配信される
        // given (前提条件):
        let (registry, queue, dispatcher) = setup(DispatcherConfig::default());
        let (handle, mut rx) = RecordingHandle::new();
        registry
            .add(member(ConnectionId::generate(), "Alice", handle))
            .await;
        let worker = tokio::spawn(dispatcher.run());

        // when (操作):
        for i in 0..20 {
            queue.enqueue(text(&format!("Alice: {i}"))).await.unwrap();
        }

        // then (期待する結果):
        for i in 0..20 {
            assert_eq!(rx.recv().await, Some(format!("Alice: {i}")));
        }
        drop(queue);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_when_queue_dropped() {
        // テスト項目: 全てのキューハンドルが破棄されるとディスパッチャが終了する
        // given (前提条件):
        let (_registry, queue, dispatcher) = setup(DispatcherConfig::default());
        let cloned = queue.clone();
        let worker = tokio::spawn(dispatcher.run());

        // when (操作):
        drop(queue);
        drop(cloned);

        // then (期待する結果):
        let finished = tokio::time::timeout(Duration::from_secs(1), worker).await;
        assert!(finished.is_ok());
    }

    #[tokio::test]
    async fn test_enqueue_after_dispatcher_stopped_fails() {
        // テスト項目: ディスパッチャ停止後の enqueue は Closed エラーになる
        // given (前提条件):
        let (_registry, queue, dispatcher) = setup(DispatcherConfig::default());

        // when (操作):
        drop(dispatcher);
        let result = queue.enqueue(text("nobody listens")).await;

        // then (期待する結果):
        assert_eq!(result, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn test_bounded_queue_applies_backpressure() {
        // テスト項目: 有界キューが満杯の場合、enqueue は破棄せずに待機する
        // given (前提条件):
        let (registry, queue, dispatcher) = setup(DispatcherConfig {
            queue_capacity: Some(1),
            write_timeout: Duration::from_secs(1),
        });
        assert!(queue.is_bounded());
        let (handle, mut rx) = RecordingHandle::new();
        registry
            .add(member(ConnectionId::generate(), "Alice", handle))
            .await;
        queue.enqueue(text("first")).await.unwrap();

        // when (操作):
        let producer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.enqueue(text("second")).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let blocked = !producer.is_finished();
        let worker = tokio::spawn(dispatcher.run());

        // then (期待する結果):
        assert!(blocked);
        let result = tokio::time::timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer should resume once the dispatcher drains the queue")
            .unwrap();
        assert_eq!(result, Ok(()));
        assert_eq!(rx.recv().await.as_deref(), Some("first"));
        assert_eq!(rx.recv().await.as_deref(), Some("second"));
        drop(queue);
        worker.await.unwrap();
    }
}
