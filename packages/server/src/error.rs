//! Server-level error definitions.

use thiserror::Error;

/// Errors that take the whole coordinator process down.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server stopped unexpectedly")]
    Serve(#[source] std::io::Error),
}
