//! Coordinator operation errors.

use banter_shared::ParticipantId;
use thiserror::Error;

/// Errors raised by registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// A join used an identifier that is already registered. The new stream
    /// is not registered and the original entry is unaffected.
    #[error("participant {0} is already connected")]
    DuplicateParticipant(ParticipantId),

    /// A relay referenced an identifier that is not registered. The event is
    /// dropped.
    #[error("participant {0} is not connected")]
    UnknownSender(ParticipantId),
}
