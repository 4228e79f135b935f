//! Shared application state.

use crate::coordinator::Coordinator;

/// State handed to every handler. The coordinator is the only shared mutable
/// thing in the process; everything else lives on the connection tasks.
pub struct AppState {
    pub coordinator: Coordinator,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            coordinator: Coordinator::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
