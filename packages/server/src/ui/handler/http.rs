//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{MemberDto, MembersDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint listing current members (for testing purposes)
pub async fn debug_members(State(state): State<Arc<AppState>>) -> Json<MembersDto> {
    let members = state.registry.snapshot().await;

    // Domain Model から DTO への変換
    let mut members: Vec<MemberDto> = members.iter().map(MemberDto::from).collect();
    members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)));

    Json(MembersDto {
        payload_mode: state.relay_message_usecase.mode().to_string(),
        count: members.len(),
        members,
    })
}
