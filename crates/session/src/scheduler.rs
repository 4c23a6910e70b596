//! Fixed-cadence poll scheduler.
//!
//! Each tick decides, in order: whether the session has gone idle, whether
//! polling is paused, whether the link needs reopening, whether a reply is
//! still fresh, and finally whether to poll the current channel. The
//! renderer picks the next channel; the scheduler only stores it.

use tracing::trace;

use crate::connection::ConnectionManager;
use crate::render::Renderer;
use crate::state::SessionState;
use crate::transport::Transport;
use crate::types::{ConnectionState, SessionConfig, TickOutcome};

/// Decides once per tick whether to reconnect and whether to poll.
#[derive(Debug, Clone)]
pub struct PollScheduler {
    config: SessionConfig,
}

impl PollScheduler {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs one tick.
    pub fn tick<T: Transport>(
        &self,
        state: &mut SessionState,
        connection: &mut ConnectionManager<T>,
        renderer: &mut dyn Renderer,
    ) -> TickOutcome {
        state.idle_ticks = state.idle_ticks.saturating_add(1);
        if state.idle_ticks > self.config.idle_budget {
            trace!(cursor = state.cursor, "idle budget exceeded, rewinding cursor");
            state.rewind(&self.config);
            return TickOutcome::IdleReset;
        }

        if !state.polling_active(&self.config) {
            return TickOutcome::Paused;
        }

        // A tick spent on a live or pending link counts as an attempt; a dead
        // link is reopened below and counted there.
        if !state.connection.needs_open() {
            state.retries = state.retries.saturating_add(1);
        }
        connection.ensure_open(state, renderer);
        if state.connection != ConnectionState::Open {
            return TickOutcome::NotOpen;
        }

        if state.quiet > 0 {
            state.quiet -= 1;
            return TickOutcome::Quiet;
        }

        let channel = state.cursor;
        let outcome = match renderer.poll_request(channel) {
            Some(request) => TickOutcome::Polled(connection.send(state, renderer, &request)),
            None => TickOutcome::Skipped,
        };
        state.cursor = renderer.next_channel(channel);
        trace!(channel, next = state.cursor, ?outcome, "poll tick");
        outcome
    }

    /// Re-arms polling from the first channel. Safe to call between ticks.
    pub fn refresh(&self, state: &mut SessionState) {
        trace!(cursor = state.cursor, idle_ticks = state.idle_ticks, "refresh");
        state.rewind(&self.config);
    }
}
