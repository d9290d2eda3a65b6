//! Server state shared by all handlers.

use std::sync::Arc;

use crate::{
    domain::MemberRegistry,
    usecase::{JoinMemberUseCase, LeaveMemberUseCase, RelayMessageUseCase},
};

/// Shared application state
pub struct AppState {
    /// MemberRegistry（接続中メンバーの管理）
    pub registry: Arc<dyn MemberRegistry>,
    /// JoinMemberUseCase（メンバー参加のユースケース）
    pub join_member_usecase: Arc<JoinMemberUseCase>,
    /// RelayMessageUseCase（メッセージ中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// LeaveMemberUseCase（メンバー退出のユースケース）
    pub leave_member_usecase: Arc<LeaveMemberUseCase>,
}
