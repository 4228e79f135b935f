//! Per-recipient fan-out results.
//!
//! Broadcast is best-effort: one dead recipient must never abort delivery to
//! the rest. Instead of a single pass/fail, a fan-out returns one result per
//! recipient so callers (and tests) can see exactly who missed an event.

use banter_shared::ParticipantId;
use thiserror::Error;

/// Failure to hand an event to one recipient's delivery channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The recipient's channel is closed; its connection task has ended.
    #[error("delivery channel for participant {0} is closed")]
    ChannelClosed(ParticipantId),
}

/// Outcome of delivering one event to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: ParticipantId,
    pub result: Result<(), DeliveryError>,
}

/// Outcome of one broadcast, one entry per recipient.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub deliveries: Vec<Delivery>,
}

impl BroadcastReport {
    pub(super) fn record(&mut self, recipient: ParticipantId, result: Result<(), DeliveryError>) {
        self.deliveries.push(Delivery { recipient, result });
    }

    /// Total number of attempted deliveries.
    pub fn recipients(&self) -> usize {
        self.deliveries.len()
    }

    /// Number of deliveries that reached the recipient's channel.
    pub fn delivered(&self) -> usize {
        self.deliveries.iter().filter(|d| d.result.is_ok()).count()
    }

    /// Recipients whose delivery failed.
    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| d.result.is_err())
    }
}
