//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Roster returned by the participants endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterDto {
    /// Current value of the coordinator's Lamport clock.
    pub clock: u64,
    pub participants: Vec<ParticipantDto>,
}

/// One connected participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub participant_id: u64,
    pub joined_at: String, // ISO 8601
}
