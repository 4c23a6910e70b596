//! WebSocket read pump: forwards inbound frames as session events.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::types::TransportEvent;

/// Why the read pump stopped.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReadEnd {
    /// Cancelled locally (superseded, closed, or the writer failed).
    Cancelled,
    /// The device closed the connection or the stream ended.
    Remote,
    /// The stream failed.
    Failed(String),
}

/// Reads frames until the stream ends or the link is cancelled.
///
/// Text frames become [`TransportEvent::Message`]; pings are answered
/// through the write queue; binary frames are ignored.
pub(crate) async fn read_pump<S>(
    mut read: S,
    events_tx: mpsc::Sender<TransportEvent>,
    write_tx: mpsc::Sender<tungstenite::Message>,
    cancel: CancellationToken,
) -> ReadEnd
where
    S: StreamExt<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
{
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return ReadEnd::Cancelled,

            msg = read.next() => {
                match msg {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        let text: &str = &text;
                        trace!(frame = text, "received text frame");
                        if events_tx
                            .send(TransportEvent::Message(text.to_owned()))
                            .await
                            .is_err()
                        {
                            return ReadEnd::Cancelled;
                        }
                    }
                    Some(Ok(tungstenite::Message::Ping(data))) => {
                        trace!("received ping, sending pong");
                        let _ = write_tx.try_send(tungstenite::Message::Pong(data));
                    }
                    Some(Ok(tungstenite::Message::Close(_))) => {
                        debug!("received close frame");
                        return ReadEnd::Remote;
                    }
                    Some(Ok(_)) => {} // Binary, Pong, raw frames
                    Some(Err(e)) => {
                        warn!("WebSocket read error: {e}");
                        return ReadEnd::Failed(e.to_string());
                    }
                    None => {
                        debug!("WebSocket stream ended");
                        return ReadEnd::Remote;
                    }
                }
            }
        }
    }
}
