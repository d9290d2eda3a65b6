//! UseCase: メンバー参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinMemberUseCase::execute() メソッド
//! - レジストリへの登録と参加通知のキュー投入
//!
//! ### どのような状況を想定しているか
//! - 正常系：名前付きメンバーの参加（参加通知あり）
//! - 正常系：名前なしメンバーの参加（通知なし）
//! - 異常系：ディスパッチャ停止後の参加

use std::sync::Arc;

use hiroba_shared::time::get_timestamp_millis;

use crate::domain::{
    ConnectionHandle, ConnectionId, DisplayName, Member, MemberRegistry, OutboundMessage,
    OutboundQueue, QueueError, Timestamp,
};

/// メンバー参加のユースケース
pub struct JoinMemberUseCase {
    registry: Arc<dyn MemberRegistry>,
    queue: Arc<dyn OutboundQueue>,
}

impl JoinMemberUseCase {
    pub fn new(registry: Arc<dyn MemberRegistry>, queue: Arc<dyn OutboundQueue>) -> Self {
        Self { registry, queue }
    }

    /// Register the connection and announce it if it has a name.
    ///
    /// The member is registered before the notice is queued, so the joining
    /// member receives its own "joined" line.
    ///
    /// # Errors
    ///
    /// `QueueError::Closed` if the notice could not be queued. The member stays
    /// registered; the caller is expected to run the leave path.
    pub async fn execute(
        &self,
        id: ConnectionId,
        name: Option<DisplayName>,
        handle: Arc<dyn ConnectionHandle>,
    ) -> Result<Member, QueueError> {
        let member = Member::new(
            id,
            name,
            Timestamp::new(get_timestamp_millis()),
            handle,
        );
        self.registry.add(member.clone()).await;

        if let Some(name) = &member.name {
            self.queue.enqueue(OutboundMessage::joined(name)).await?;
        }

        Ok(member)
    }
}
