//! UseCase: メンバー退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveMemberUseCase::execute() メソッド
//! - レジストリからの削除と退出通知のキュー投入
//!
//! ### どのような状況を想定しているか
//! - 正常系：名前付きメンバーの退出（退出通知あり）
//! - エッジケース：ディスパッチャが先に削除済み（削除は冪等、通知は送る）
//! - エッジケース：名前なしメンバーの退出（通知なし）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, DisplayName, MemberRegistry, OutboundMessage, OutboundQueue, QueueError,
};

/// メンバー退出のユースケース
pub struct LeaveMemberUseCase {
    registry: Arc<dyn MemberRegistry>,
    queue: Arc<dyn OutboundQueue>,
}

impl LeaveMemberUseCase {
    pub fn new(registry: Arc<dyn MemberRegistry>, queue: Arc<dyn OutboundQueue>) -> Self {
        Self { registry, queue }
    }

    /// Deregister the connection and announce the departure if it had a name.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - this call removed the member
    /// * `Ok(false)` - the dispatcher had already pruned it
    pub async fn execute(
        &self,
        id: &ConnectionId,
        name: Option<&DisplayName>,
    ) -> Result<bool, QueueError> {
        let removed = self.registry.remove(id).await;

        if let Some(name) = name {
            self.queue.enqueue(OutboundMessage::left(name)).await?;
        }

        Ok(removed)
    }
}
