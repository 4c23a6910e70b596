//! The owned device session.

use crate::connection::ConnectionManager;
use crate::render::Renderer;
use crate::scheduler::PollScheduler;
use crate::state::SessionState;
use crate::transport::Transport;
use crate::types::{SendOutcome, SessionConfig, TickOutcome, TransportEvent};

/// One device session: its state, the connection manager, the scheduler
/// and the renderer they report to.
///
/// Every mutation goes through `&mut self`, so a session driven from a
/// single task sees timer ticks, refreshes and transport events strictly
/// one at a time.
pub struct Session<T, R> {
    state: SessionState,
    connection: ConnectionManager<T>,
    scheduler: PollScheduler,
    renderer: R,
}

impl<T: Transport, R: Renderer> Session<T, R> {
    pub fn new(transport: T, renderer: R, url: impl Into<String>, config: SessionConfig) -> Self {
        Self {
            state: SessionState::new(&config),
            connection: ConnectionManager::new(transport, url, config.clone()),
            scheduler: PollScheduler::new(config),
            renderer,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        self.scheduler.config()
    }

    pub fn connection(&self) -> &ConnectionManager<T> {
        &self.connection
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Runs one scheduler tick.
    pub fn tick(&mut self) -> TickOutcome {
        self.scheduler
            .tick(&mut self.state, &mut self.connection, &mut self.renderer)
    }

    /// Re-arms polling from the first channel.
    pub fn refresh(&mut self) {
        self.scheduler.refresh(&mut self.state);
    }

    /// Applies a transport lifecycle event.
    pub fn handle_event(&mut self, event: TransportEvent) {
        self.connection
            .handle_event(&mut self.state, &mut self.renderer, event);
    }

    /// Sends an out-of-band frame (e.g. a user-initiated write).
    pub fn send(&mut self, text: &str) -> SendOutcome {
        self.connection
            .send(&mut self.state, &mut self.renderer, text)
    }

    /// Closes the link.
    pub fn close(&mut self) {
        self.connection.close(&mut self.state);
    }
}
