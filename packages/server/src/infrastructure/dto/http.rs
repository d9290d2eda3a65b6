//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// One registered member, as exposed by `/debug/members`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub id: String,
    /// `None` in document mode
    pub name: Option<String>,
    /// RFC 3339 (UTC)
    pub joined_at: String,
}

/// Registry overview returned by `/debug/members`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersDto {
    pub payload_mode: String,
    pub count: usize,
    pub members: Vec<MemberDto>,
}
