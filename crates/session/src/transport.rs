//! The seam between the session and the wire.

use tokio_tungstenite::tungstenite;

/// Errors a transport reports synchronously.
///
/// Asynchronous failures (refused, dropped, protocol errors) arrive as
/// [`TransportEvent`](crate::TransportEvent)s instead.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("WebSocket error: {0}")]
    Ws(#[from] tungstenite::Error),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("connection attempt timed out")]
    Timeout,

    #[error("write queue full")]
    QueueFull,

    #[error("connection closed")]
    Closed,
}

/// A full-duplex text channel to a single remote endpoint.
///
/// `open` only starts an attempt; completion and every later lifecycle
/// change are reported as events through whatever channel the
/// implementation was built with.
pub trait Transport {
    /// Starts a new connection attempt, replacing any previous connection.
    fn open(&mut self, url: &str) -> Result<(), TransportError>;

    /// Queues one text frame on the current connection.
    fn transmit(&mut self, text: &str) -> Result<(), TransportError>;

    /// Tears down the current connection, if any.
    fn close(&mut self);
}
