//! Connection manager for the single device link.
//!
//! Owns the transport and the reconnection policy. There is no backoff:
//! a dead or stale link is simply reopened on the next call, and callers
//! drive that cadence from the scheduler tick.

use tracing::{debug, info, trace, warn};

use devlink_protocol::Frame;

use crate::render::Renderer;
use crate::state::SessionState;
use crate::transport::Transport;
use crate::types::{ConnectionState, SendOutcome, SessionConfig, Status, TransportEvent};

/// Manages the lifecycle of the one connection to the device.
pub struct ConnectionManager<T> {
    transport: T,
    url: String,
    config: SessionConfig,
}

impl<T: Transport> ConnectionManager<T> {
    /// Creates a manager that will connect to `url` on first use.
    pub fn new(transport: T, url: impl Into<String>, config: SessionConfig) -> Self {
        Self {
            transport,
            url: url.into(),
            config,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Starts a connection attempt if the link is dead or stale.
    ///
    /// No-op while an attempt is outstanding or while the link is open and
    /// the peer has answered recently. Returns `true` if an attempt was
    /// started (or refused by the transport).
    pub fn ensure_open(&mut self, state: &mut SessionState, renderer: &mut dyn Renderer) -> bool {
        let stale =
            state.connection == ConnectionState::Open && state.retries_exhausted(&self.config);
        if !state.connection.needs_open() && !stale {
            return false;
        }

        let status = if state.retries > 0 {
            Status::retrying()
        } else {
            Status::opening()
        };
        renderer.show_status(&status);
        state.retries = state.retries.saturating_add(1);

        match self.transport.open(&self.url) {
            Ok(()) => {
                debug!(
                    url = %self.url,
                    from = ?state.connection,
                    retries = state.retries,
                    "connection attempt started"
                );
                state.connection = ConnectionState::Connecting;
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "could not start connection attempt");
                state.connection = ConnectionState::Failed;
                renderer.show_status(&Status::error(format!("ERROR: {e}")));
            }
        }
        true
    }

    /// Sends one frame, fire-and-forget.
    ///
    /// A closed, failed or stale link is reopened instead of transmitting.
    /// Any other non-open state drops the frame.
    pub fn send(
        &mut self,
        state: &mut SessionState,
        renderer: &mut dyn Renderer,
        text: &str,
    ) -> SendOutcome {
        if matches!(
            state.connection,
            ConnectionState::Closed | ConnectionState::Failed
        ) || state.retries_exhausted(&self.config)
        {
            self.ensure_open(state, renderer);
            return SendOutcome::Reconnecting;
        }

        if state.connection != ConnectionState::Open {
            trace!(state = ?state.connection, frame = text, "link not usable, frame dropped");
            return SendOutcome::Dropped(state.connection);
        }

        match self.transport.transmit(text) {
            Ok(()) => {
                state.retries = state.retries.saturating_add(1);
                state.quiet = self.config.quiet_window;
                trace!(frame = text, retries = state.retries, "frame sent");
                renderer.show_status(&Status::info(format!("SENT: {text}")));
                SendOutcome::Sent
            }
            Err(e) => {
                warn!(error = %e, frame = text, "transmit failed");
                renderer.show_status(&Status::error(format!("ERROR: {e}")));
                SendOutcome::Failed
            }
        }
    }

    /// Applies a transport lifecycle event.
    ///
    /// Events are accepted whatever attempt they came from; the latest one
    /// wins.
    pub fn handle_event(
        &mut self,
        state: &mut SessionState,
        renderer: &mut dyn Renderer,
        event: TransportEvent,
    ) {
        match event {
            TransportEvent::Opened => self.on_open(state, renderer),
            TransportEvent::Closed => self.on_close(state, renderer),
            TransportEvent::Message(text) => self.on_message(state, renderer, &text),
            TransportEvent::Error(text) => self.on_error(renderer, &text),
        }
    }

    /// Closes the link for good (shutdown).
    pub fn close(&mut self, state: &mut SessionState) {
        self.transport.close();
        state.connection = ConnectionState::Closed;
    }

    fn on_open(&mut self, state: &mut SessionState, renderer: &mut dyn Renderer) {
        info!(url = %self.url, "connected to device");
        state.connection = ConnectionState::Open;
        state.retries = 0;
        renderer.show_status(&Status::connected());
    }

    fn on_close(&mut self, state: &mut SessionState, renderer: &mut dyn Renderer) {
        info!(url = %self.url, "disconnected from device");
        state.connection = ConnectionState::Closed;
        renderer.show_status(&Status::disconnected());
    }

    fn on_message(&mut self, state: &mut SessionState, renderer: &mut dyn Renderer, text: &str) {
        // Any frame at all proves the peer is alive.
        state.retries = 0;
        state.quiet = 0;

        match Frame::parse(text) {
            Ok(frame) => {
                trace!(key = %frame.key, value = %frame.value, "received frame");
                renderer.show_status(&Status::info(format!("RECEIVED: {text}")));
                renderer.update_display_value(&frame.key, &frame.value);
                renderer.update_control_state(&frame.control_key(), &frame.value);
            }
            Err(e) => {
                warn!(error = %e, "ignoring malformed frame");
                renderer.show_status(&Status::error(format!("ERROR: {e}")));
            }
        }
    }

    fn on_error(&mut self, renderer: &mut dyn Renderer, text: &str) {
        warn!(error = text, "transport error");
        renderer.show_status(&Status::error(format!("ERROR: {text}")));
    }
}
