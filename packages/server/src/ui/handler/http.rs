//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use banter_shared::time::timestamp_to_rfc3339;

use crate::ui::{
    dto::{ParticipantDto, RosterDto},
    state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current membership and coordinator clock, for operational visibility.
pub async fn get_participants(State(state): State<Arc<AppState>>) -> Json<RosterDto> {
    let clock = state.coordinator.clock().await;
    let participants = state
        .coordinator
        .participants()
        .await
        .into_iter()
        .map(|p| ParticipantDto {
            participant_id: p.id,
            joined_at: timestamp_to_rfc3339(p.joined_at),
        })
        .collect();

    Json(RosterDto {
        clock,
        participants,
    })
}
