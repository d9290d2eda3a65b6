//! InMemory Member Registry 実装
//!
//! ドメイン層が定義する MemberRegistry trait の具体的な実装。
//! `Mutex<HashMap>` を唯一の排他領域として使用し、マップとロックを外部に公開しません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Member, MemberRegistry};

/// インメモリ Member Registry 実装
#[derive(Default)]
pub struct InMemoryMemberRegistry {
    /// Key: ConnectionId, Value: Member
    members: Mutex<HashMap<ConnectionId, Member>>,
}

impl InMemoryMemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberRegistry for InMemoryMemberRegistry {
    async fn add(&self, member: Member) {
        let id = member.id;
        let replaced = self.members.lock().await.insert(id, member).is_some();
        if replaced {
            tracing::debug!("Member '{}' overwritten in registry", id);
        } else {
            tracing::debug!("Member '{}' added to registry", id);
        }
    }

    async fn remove(&self, id: &ConnectionId) -> bool {
        let removed = self.members.lock().await.remove(id).is_some();
        if removed {
            tracing::debug!("Member '{}' removed from registry", id);
        }
        removed
    }

    async fn snapshot(&self) -> Vec<Member> {
        self.members.lock().await.values().cloned().collect()
    }

    async fn count(&self) -> usize {
        self.members.lock().await.len()
    }
}
