//! Banter participant client.
//!
//! Owns a local Lamport clock, a send path (keystrokes to the coordinator)
//! and a receive path (coordinator broadcasts to the terminal), running
//! concurrently on one connection.

pub mod error;
mod runner;
pub mod session;

pub use error::ClientError;
pub use runner::run_client;
pub use session::ParticipantSession;
