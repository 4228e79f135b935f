//! Participant session state.
//!
//! Pure clock-and-event logic for one connected user, kept free of transport
//! concerns so the Lamport behavior is testable on its own.

use banter_shared::{ChatEvent, LamportClock, ParticipantId};

/// One participant's identity and local logical clock.
///
/// Every user-originated action (join, chat line, leave) advances the clock
/// by one local event before the event is constructed; every inbound
/// broadcast advances it by the receive rule.
#[derive(Debug)]
pub struct ParticipantSession {
    id: ParticipantId,
    clock: LamportClock,
}

impl ParticipantSession {
    /// Create a session with its clock at 0.
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            clock: LamportClock::new(),
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Current local clock value.
    pub fn clock(&self) -> u64 {
        self.clock.value()
    }

    /// Join announcement, sent as the first frame of the session.
    pub fn join_event(&mut self) -> ChatEvent {
        let stamp = self.clock.tick();
        ChatEvent::join(self.id, stamp)
    }

    /// Chat message for one line of user input.
    pub fn message_event(&mut self, text: impl Into<String>) -> ChatEvent {
        let stamp = self.clock.tick();
        ChatEvent::message(self.id, stamp, text)
    }

    /// Leave announcement for graceful shutdown.
    pub fn leave_event(&mut self) -> ChatEvent {
        let stamp = self.clock.tick();
        ChatEvent::leave(self.id, stamp)
    }

    /// Apply the receive rule for an inbound broadcast and return the
    /// resulting local clock value for display.
    pub fn apply_incoming(&mut self, event: &ChatEvent) -> u64 {
        self.clock.observe(event.clock)
    }
}
