use crate::types::{ConnectionState, SessionConfig};

/// All mutable state of one device session.
///
/// Constructed once and lent to the connection manager and the scheduler
/// on every call; neither keeps a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Lifecycle of the single connection.
    pub connection: ConnectionState,
    /// Attempts (opens and transmitted polls) since the peer last showed
    /// signs of life.
    pub retries: u32,
    /// Ticks left in the quiet window.
    pub quiet: u32,
    /// Channel polled on the next eligible tick.
    pub cursor: i32,
    /// Ticks since the cursor was last rewound.
    pub idle_ticks: u32,
}

impl SessionState {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            connection: ConnectionState::Idle,
            retries: 0,
            quiet: 0,
            cursor: config.channel_min,
            idle_ticks: 0,
        }
    }

    /// Whether the cursor is still inside the active polling range.
    pub fn polling_active(&self, config: &SessionConfig) -> bool {
        self.cursor <= config.channel_max
    }

    /// Whether the peer has gone quiet for longer than the retry threshold.
    pub fn retries_exhausted(&self, config: &SessionConfig) -> bool {
        self.retries > config.retry_threshold
    }

    /// Rewinds the cursor and restarts the idle budget.
    pub fn rewind(&mut self, config: &SessionConfig) {
        self.cursor = config.channel_min;
        self.idle_ticks = 0;
    }
}
