//! Member Registry trait 定義
//!
//! 接続中のメンバーを管理するインターフェース。
//! 全ての操作は単一の排他領域の中で行われ、途中状態が観測されることはありません。

use async_trait::async_trait;

use super::{ConnectionId, Member};

/// Concurrency-safe set of live members, keyed by connection.
#[async_trait]
pub trait MemberRegistry: Send + Sync {
    /// Insert or overwrite the member for `member.id` (last write wins)
    async fn add(&self, member: Member);

    /// Delete the member for `id`.
    ///
    /// Returns `true` if an entry was deleted. Removing an absent id is a no-op.
    async fn remove(&self, id: &ConnectionId) -> bool;

    /// Independent point-in-time copy of all members
    async fn snapshot(&self) -> Vec<Member>;

    /// Number of members currently registered
    async fn count(&self) -> usize;
}
