//! Client-side error definitions.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors that end a participant session. None of them is recoverable: the
/// client does not reconnect.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport could not be established.
    #[error("failed to connect to coordinator at {addr}")]
    ConnectionFailure {
        addr: String,
        #[source]
        source: tungstenite::Error,
    },

    /// The transport failed mid-session.
    #[error("connection to coordinator lost")]
    ConnectionLost(#[source] tungstenite::Error),

    /// The coordinator closed the stream.
    #[error("connection closed by coordinator")]
    ConnectionClosed,

    /// An outbound event could not be encoded.
    #[error("failed to encode outbound event")]
    Encode(#[from] serde_json::Error),
}
