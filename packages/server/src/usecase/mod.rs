//! UseCase layer
//!
//! セッションのライフサイクル（参加・中継・退出）をユースケースとして定義します。
//! 各ユースケースは Domain 層の trait（MemberRegistry, OutboundQueue）にのみ依存します。

mod error;
mod join_member;
mod leave_member;
mod relay_message;
mod session;

pub use error::RelayError;
pub use join_member::JoinMemberUseCase;
pub use leave_member::LeaveMemberUseCase;
pub use relay_message::RelayMessageUseCase;
pub use session::{ConnectionSession, SessionEnd, SessionOutcome, SessionState};
