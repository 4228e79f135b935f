//! Chat event wire shape.
//!
//! Events travel between participant and coordinator as JSON text frames.
//! They are immutable value objects: the coordinator never mutates a received
//! event, it stamps fresh copies when relaying.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a connected participant for the life of its
/// connection (a port number works well in simple deployments).
pub type ParticipantId = u64;

/// Identifier used on events the coordinator synthesizes itself, such as the
/// roster snapshot sent to a fresh joiner.
pub const COORDINATOR_ID: ParticipantId = 0;

/// Event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// First frame of a session, announces the participant id.
    Join,
    /// Graceful departure announcement.
    Leave,
    /// User-authored chat text.
    Message,
    /// Coordinator-synthesized notice (join/leave broadcast, roster).
    Info,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Join => "join",
            EventKind::Leave => "leave",
            EventKind::Message => "message",
            EventKind::Info => "info",
        };
        write!(f, "{label}")
    }
}

/// One chat event as carried on the wire.
///
/// `clock` defaults to 0 when absent so that a malformed or missing
/// timestamp can never pull a clock backwards (the receive rule treats 0 as
/// a plain local advance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Logical timestamp at time of send.
    #[serde(default)]
    pub clock: u64,
    /// Originating participant, or [`COORDINATOR_ID`] for synthesized events.
    pub participant_id: ParticipantId,
    /// Payload text, or human-readable info text. May be empty for Info.
    #[serde(default)]
    pub content: String,
    /// Event category.
    pub kind: EventKind,
}

impl ChatEvent {
    /// Join announcement from a participant.
    pub fn join(participant_id: ParticipantId, clock: u64) -> Self {
        Self {
            clock,
            participant_id,
            content: String::new(),
            kind: EventKind::Join,
        }
    }

    /// Leave announcement from a participant.
    pub fn leave(participant_id: ParticipantId, clock: u64) -> Self {
        Self {
            clock,
            participant_id,
            content: String::new(),
            kind: EventKind::Leave,
        }
    }

    /// User-authored chat message.
    pub fn message(participant_id: ParticipantId, clock: u64, content: impl Into<String>) -> Self {
        Self {
            clock,
            participant_id,
            content: content.into(),
            kind: EventKind::Message,
        }
    }

    /// Coordinator-synthesized notice.
    pub fn info(participant_id: ParticipantId, clock: u64, content: impl Into<String>) -> Self {
        Self {
            clock,
            participant_id,
            content: content.into(),
            kind: EventKind::Info,
        }
    }

    /// Copy of this event re-stamped with a fresh logical timestamp.
    pub fn restamped(&self, clock: u64) -> Self {
        Self {
            clock,
            ..self.clone()
        }
    }
}
