//! WebSocket write pump: drains the link's outbound queue into the socket.

use futures_util::SinkExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

/// Why the write pump stopped.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum WriteEnd {
    /// The link was cancelled; a close frame was offered to the device.
    Cancelled,
    /// Every sender dropped; a close frame was offered to the device.
    Drained,
    /// The socket rejected a frame. The link token is cancelled so the
    /// reader stops too.
    Failed(String),
}

/// Writes queued frames in order until the link ends.
pub(crate) async fn write_pump<S>(
    mut write: S,
    mut write_rx: mpsc::Receiver<tungstenite::Message>,
    link_cancel: CancellationToken,
) -> WriteEnd
where
    S: SinkExt<tungstenite::Message, Error = tungstenite::Error> + Unpin,
{
    let end = loop {
        let msg = tokio::select! {
            _ = link_cancel.cancelled() => break WriteEnd::Cancelled,
            msg = write_rx.recv() => msg,
        };
        let Some(msg) = msg else {
            break WriteEnd::Drained;
        };
        trace!(len = msg.len(), "writing frame");
        if let Err(e) = write.send(msg).await {
            warn!(error = %e, "device write failed");
            link_cancel.cancel();
            return WriteEnd::Failed(e.to_string());
        }
    };

    let _ = write.send(tungstenite::Message::Close(None)).await;
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::sink;

    fn recording_sink(
        tx: mpsc::UnboundedSender<tungstenite::Message>,
    ) -> impl SinkExt<tungstenite::Message, Error = tungstenite::Error> + Unpin {
        Box::pin(sink::unfold(tx, |tx, msg: tungstenite::Message| async move {
            let _ = tx.send(msg);
            Ok::<_, tungstenite::Error>(tx)
        }))
    }

    fn broken_sink() -> impl SinkExt<tungstenite::Message, Error = tungstenite::Error> + Unpin {
        Box::pin(sink::unfold((), |(), _msg: tungstenite::Message| async move {
            Err::<(), _>(tungstenite::Error::ConnectionClosed)
        }))
    }

    #[tokio::test]
    async fn polls_go_out_in_order_then_close() {
        let (sink_tx, mut sink_rx) = mpsc::unbounded_channel();
        let (write_tx, write_rx) = mpsc::channel(4);

        write_tx
            .send(tungstenite::Message::text("pwm[0]=-1"))
            .await
            .unwrap();
        write_tx
            .send(tungstenite::Message::text("pwm[5]=75"))
            .await
            .unwrap();
        drop(write_tx);

        let end = write_pump(recording_sink(sink_tx), write_rx, CancellationToken::new()).await;
        assert_eq!(end, WriteEnd::Drained);

        assert_eq!(
            sink_rx.recv().await,
            Some(tungstenite::Message::text("pwm[0]=-1"))
        );
        assert_eq!(
            sink_rx.recv().await,
            Some(tungstenite::Message::text("pwm[5]=75"))
        );
        assert!(matches!(
            sink_rx.recv().await,
            Some(tungstenite::Message::Close(None))
        ));
    }

    #[tokio::test]
    async fn write_failure_cancels_link() {
        let (write_tx, write_rx) = mpsc::channel(4);
        let link_cancel = CancellationToken::new();

        write_tx
            .send(tungstenite::Message::text("pwm[0]=-1"))
            .await
            .unwrap();

        let end = write_pump(broken_sink(), write_rx, link_cancel.clone()).await;
        assert!(matches!(end, WriteEnd::Failed(_)));
        assert!(link_cancel.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_link_offers_close_without_pending_frames() {
        let (sink_tx, mut sink_rx) = mpsc::unbounded_channel();
        let (_write_tx, write_rx) = mpsc::channel(4);
        let link_cancel = CancellationToken::new();
        link_cancel.cancel();

        let end = write_pump(recording_sink(sink_tx), write_rx, link_cancel).await;
        assert_eq!(end, WriteEnd::Cancelled);
        assert!(matches!(
            sink_rx.recv().await,
            Some(tungstenite::Message::Close(None))
        ));
        assert!(sink_rx.try_recv().is_err());
    }
}
