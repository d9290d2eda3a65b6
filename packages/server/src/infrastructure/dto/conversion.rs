//! Conversion logic between domain entities and DTOs.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::Member;
use crate::infrastructure::dto::http as dto;

impl From<&Member> for dto::MemberDto {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.to_string(),
            name: member.name.as_ref().map(|name| name.as_str().to_string()),
            joined_at: timestamp_to_rfc3339(member.joined_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{ConnectionId, DisplayName, MockConnectionHandle, Timestamp};

    #[test]
    fn test_member_to_dto() {
        // テスト項目: Member が MemberDto に正しく変換される
        // given (前提条件):
        let id = ConnectionId::generate();
        let member = Member::new(
            id,
            Some(DisplayName::new("Alice".to_string())),
            Timestamp::new(1672531200000),
            Arc::new(MockConnectionHandle::new()),
        );

        // when (操作):
        let dto = dto::MemberDto::from(&member);

        // then (期待する結果):
        assert_eq!(dto.id, id.to_string());
        assert_eq!(dto.name.as_deref(), Some("Alice"));
        assert_eq!(dto.joined_at, "2023-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_unnamed_member_to_dto() {
        // テスト項目: 名前のない Member は name が None の DTO に変換される
        // given (前提条件):
        let member = Member::new(
            ConnectionId::generate(),
            None,
            Timestamp::new(0),
            Arc::new(MockConnectionHandle::new()),
        );

        // when (操作):
        let dto = dto::MemberDto::from(&member);

        // then (期待する結果):
        assert!(dto.name.is_none());
        assert_eq!(
            serde_json::to_value(&dto).unwrap()["name"],
            serde_json::Value::Null
        );
    }
}
