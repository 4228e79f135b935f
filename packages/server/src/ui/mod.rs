//! WebSocket and HTTP surface of the coordinator.

mod dto;
mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::run;
