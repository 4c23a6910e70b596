//! WebSocket transport for the device link.
//!
//! Each `open` spawns one link task: it connects (bounded by a timeout),
//! reports the outcome, then runs the read and write pumps until the link
//! drops. Lifecycle changes are delivered as [`TransportEvent`]s on the
//! channel handed to [`WsTransport::new`]. A link torn down locally (by
//! `close` or by a newer `open`) goes silent instead of reporting
//! `Closed`, so a replaced connection cannot clobber its successor's state.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use devlink_protocol::constants::{CONNECT_TIMEOUT, MAX_FRAME_SIZE};

use crate::pumps::read::{ReadEnd, read_pump};
use crate::pumps::write::{WriteEnd, write_pump};
use crate::transport::{Transport, TransportError};
use crate::types::TransportEvent;

/// Outbound frames buffered per link. Polls go out one per tick, so this
/// only fills if the socket has stalled.
const WRITE_QUEUE: usize = 16;

/// Transport over a tokio-tungstenite client connection.
pub struct WsTransport {
    events_tx: mpsc::Sender<TransportEvent>,
    connect_timeout: Duration,
    link: Option<Link>,
}

/// One connection attempt and, if it succeeds, its pumps.
struct Link {
    write_tx: mpsc::Sender<tungstenite::Message>,
    cancel: CancellationToken,
    _handle: JoinHandle<()>,
}

impl WsTransport {
    /// Creates a transport that reports lifecycle events on `events_tx`.
    ///
    /// `open` spawns onto the current tokio runtime.
    pub fn new(events_tx: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            events_tx,
            connect_timeout: CONNECT_TIMEOUT,
            link: None,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn drop_link(&mut self) {
        if let Some(link) = self.link.take() {
            link.cancel.cancel();
        }
    }
}

impl Transport for WsTransport {
    fn open(&mut self, url: &str) -> Result<(), TransportError> {
        let request = url.into_client_request()?;
        if !matches!(request.uri().scheme_str(), Some("ws" | "wss")) {
            return Err(TransportError::InvalidEndpoint(url.to_string()));
        }
        self.drop_link();

        let (write_tx, write_rx) = mpsc::channel(WRITE_QUEUE);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_link(
            request,
            self.connect_timeout,
            self.events_tx.clone(),
            write_tx.clone(),
            write_rx,
            cancel.clone(),
        ));

        self.link = Some(Link {
            write_tx,
            cancel,
            _handle: handle,
        });
        Ok(())
    }

    fn transmit(&mut self, text: &str) -> Result<(), TransportError> {
        let link = self.link.as_ref().ok_or(TransportError::Closed)?;
        link.write_tx
            .try_send(tungstenite::Message::text(text))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => TransportError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
            })
    }

    fn close(&mut self) {
        self.drop_link();
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.drop_link();
    }
}

/// Connects, then pumps frames until the link ends.
///
/// `cancel` is owned by the transport; cancelling it means the link was
/// torn down locally and nothing more is reported.
async fn run_link(
    request: Request,
    connect_timeout: Duration,
    events_tx: mpsc::Sender<TransportEvent>,
    write_tx: mpsc::Sender<tungstenite::Message>,
    write_rx: mpsc::Receiver<tungstenite::Message>,
    cancel: CancellationToken,
) {
    let uri = request.uri().to_string();

    let mut ws_config = tungstenite::protocol::WebSocketConfig::default();
    ws_config.max_message_size = Some(MAX_FRAME_SIZE);
    ws_config.max_frame_size = Some(MAX_FRAME_SIZE);

    let connect = tokio::time::timeout(
        connect_timeout,
        tokio_tungstenite::connect_async_with_config(request, Some(ws_config), false),
    );
    let result = tokio::select! {
        _ = cancel.cancelled() => return,
        r = connect => r,
    };

    let ws_stream = match result {
        Ok(Ok((ws_stream, _))) => ws_stream,
        Ok(Err(e)) => {
            warn!(url = %uri, error = %e, "connection failed");
            report_failure(&events_tx, &cancel, TransportError::Ws(e)).await;
            return;
        }
        Err(_) => {
            warn!(url = %uri, timeout = ?connect_timeout, "connection attempt timed out");
            report_failure(&events_tx, &cancel, TransportError::Timeout).await;
            return;
        }
    };

    if cancel.is_cancelled() {
        return;
    }
    let _ = events_tx.send(TransportEvent::Opened).await;
    debug!(url = %uri, "link open");

    let (write, read) = ws_stream.split();
    // The writer cancels only this link's token on failure, which also
    // stops the reader without looking like a local teardown.
    let link_cancel = cancel.child_token();
    let writer = tokio::spawn(write_pump(write, write_rx, link_cancel.clone()));
    let read_end = read_pump(read, events_tx.clone(), write_tx, link_cancel.clone()).await;

    link_cancel.cancel();
    let write_end = writer.await.unwrap_or(WriteEnd::Cancelled);

    if cancel.is_cancelled() {
        debug!(url = %uri, "link torn down locally");
        return;
    }
    if let (ReadEnd::Failed(e), _) | (_, WriteEnd::Failed(e)) = (&read_end, &write_end) {
        let _ = events_tx.send(TransportEvent::Error(e.clone())).await;
    }
    let _ = events_tx.send(TransportEvent::Closed).await;
    debug!(url = %uri, ?read_end, ?write_end, "link closed");
}

async fn report_failure(
    events_tx: &mpsc::Sender<TransportEvent>,
    cancel: &CancellationToken,
    error: TransportError,
) {
    if cancel.is_cancelled() {
        return;
    }
    let _ = events_tx.send(TransportEvent::Error(error.to_string())).await;
    let _ = events_tx.send(TransportEvent::Closed).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_url_is_refused_synchronously() {
        let (tx, _rx) = mpsc::channel(8);
        let mut transport = WsTransport::new(tx);
        let err = transport.open("not a url").unwrap_err();
        assert!(matches!(err, TransportError::Ws(_)));
    }

    #[tokio::test]
    async fn non_websocket_scheme_is_refused() {
        let (tx, _rx) = mpsc::channel(8);
        let mut transport = WsTransport::new(tx);
        let err = transport.open("http://192.168.4.1/dev").unwrap_err();
        assert!(matches!(err, TransportError::InvalidEndpoint(_)));
    }

    #[tokio::test]
    async fn transmit_without_link_is_closed() {
        let (tx, _rx) = mpsc::channel(8);
        let mut transport = WsTransport::new(tx);
        assert!(matches!(
            transport.transmit("pwm[0]=-1"),
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn refused_connection_reports_error_then_closed() {
        // Bind and drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (tx, mut rx) = mpsc::channel(8);
        let mut transport = WsTransport::new(tx);
        transport.open(&format!("ws://{addr}/dev")).unwrap();

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event");
        assert!(matches!(first, Some(TransportEvent::Error(_))));
        let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event");
        assert_eq!(second, Some(TransportEvent::Closed));
    }

    #[tokio::test]
    async fn connect_timeout_is_reported() {
        // A listener that never completes the handshake.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let (tx, mut rx) = mpsc::channel(8);
        let mut transport =
            WsTransport::new(tx).with_connect_timeout(Duration::from_millis(100));
        transport.open(&format!("ws://{addr}/dev")).unwrap();

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event");
        assert_eq!(
            first,
            Some(TransportEvent::Error(TransportError::Timeout.to_string()))
        );
        assert_eq!(rx.recv().await, Some(TransportEvent::Closed));
    }

    #[tokio::test]
    async fn device_close_reports_reply_then_closed() {
        use futures_util::SinkExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(tungstenite::Message::text("pwm[0]=12.00"))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
            // Hold the socket until the client answers the close.
            while ws.next().await.is_some() {}
        });

        let (tx, mut rx) = mpsc::channel(8);
        let mut transport = WsTransport::new(tx);
        transport.open(&format!("ws://{addr}/dev")).unwrap();

        let mut events = Vec::new();
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_secs(5), rx.recv()).await
        {
            let closed = event == TransportEvent::Closed;
            events.push(event);
            if closed {
                break;
            }
        }
        assert_eq!(
            events,
            vec![
                TransportEvent::Opened,
                TransportEvent::Message("pwm[0]=12.00".into()),
                TransportEvent::Closed,
            ]
        );
    }

    #[tokio::test]
    async fn closed_link_stays_silent() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let (tx, mut rx) = mpsc::channel(8);
        let mut transport = WsTransport::new(tx);
        transport.open(&format!("ws://{addr}/dev")).unwrap();
        transport.close();

        let got = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(got.is_err(), "expected no events, got {got:?}");
    }
}
