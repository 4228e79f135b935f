//! Shared building blocks for Banter, a group-chat broadcaster ordered by
//! Lamport timestamps.
//!
//! This crate holds everything the coordinator (server) and the participant
//! (client) have in common: the wire event shape, the logical clock rule,
//! logging setup, and wall-clock helpers.

pub mod clock;
pub mod event;
pub mod logger;
pub mod time;

pub use clock::LamportClock;
pub use event::{COORDINATOR_ID, ChatEvent, EventKind, ParticipantId};
pub use logger::setup_logger;
