//! Banter broadcast coordinator.
//!
//! The coordinator owns the shared Lamport clock and the registry of
//! connected participants, and fans every chat event out to every other
//! participant over a per-connection WebSocket.

pub mod coordinator;
pub mod error;
mod ui;

pub use error::ServerError;
pub use ui::run as run_server;
