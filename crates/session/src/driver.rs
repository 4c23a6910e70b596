//! The session event loop.
//!
//! One task owns the [`Session`] and multiplexes the tick timer, transport
//! events and external commands with `select!`, so every mutation is
//! serialised without locks. Ticks never wait on the transport.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::render::Renderer;
use crate::session::Session;
use crate::transport::Transport;
use crate::types::{SessionConfig, TransportEvent};
use crate::ws_transport::WsTransport;

/// Capacity of the transport event channel.
const EVENT_QUEUE: usize = 64;

/// Capacity of the command channel.
const COMMAND_QUEUE: usize = 16;

/// Requests from outside the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Re-arm polling from the first channel.
    Refresh,
    /// Send one frame outside the poll cycle.
    Send(String),
}

/// Cloneable handle for steering a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands_tx: mpsc::Sender<Command>,
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Creates a handle plus the receiving ends the driver needs.
    pub fn channel() -> (Self, mpsc::Receiver<Command>) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE);
        let handle = Self {
            commands_tx,
            cancel: CancellationToken::new(),
        };
        (handle, commands_rx)
    }

    /// Re-arms polling. Returns `false` if the loop has stopped.
    pub async fn refresh(&self) -> bool {
        self.commands_tx.send(Command::Refresh).await.is_ok()
    }

    /// Queues an out-of-band frame. Returns `false` if the loop has stopped.
    pub async fn send(&self, text: impl Into<String>) -> bool {
        self.commands_tx
            .send(Command::Send(text.into()))
            .await
            .is_ok()
    }

    /// Stops the loop; the session closes its link on the way out.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Drives a session until `cancel` fires, then closes it and hands it back.
pub async fn run<T, R>(
    mut session: Session<T, R>,
    mut events: mpsc::Receiver<TransportEvent>,
    mut commands: mpsc::Receiver<Command>,
    cancel: CancellationToken,
) -> Session<T, R>
where
    T: Transport,
    R: Renderer,
{
    let mut interval = tokio::time::interval(session.config().tick_period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        url = %session.connection().url(),
        period = ?session.config().tick_period,
        "session loop started"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            _ = interval.tick() => {
                let outcome = session.tick();
                trace!(?outcome, "tick");
            }

            Some(event) = events.recv() => {
                debug!(?event, "transport event");
                session.handle_event(event);
            }

            Some(command) = commands.recv() => match command {
                Command::Refresh => session.refresh(),
                Command::Send(text) => {
                    let outcome = session.send(&text);
                    debug!(frame = %text, ?outcome, "out-of-band send");
                }
            },
        }
    }

    session.close();
    info!("session loop stopped");
    session
}

/// Builds a WebSocket session for `url` and spawns its loop.
pub fn spawn<R>(
    url: impl Into<String>,
    renderer: R,
    config: SessionConfig,
) -> (SessionHandle, JoinHandle<Session<WsTransport, R>>)
where
    R: Renderer + Send + 'static,
{
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
    let (handle, commands_rx) = SessionHandle::channel();
    let session = Session::new(WsTransport::new(events_tx), renderer, url, config);
    let join = tokio::spawn(run(session, events_rx, commands_rx, handle.cancel_token()));
    (handle, join)
}
