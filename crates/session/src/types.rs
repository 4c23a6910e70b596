//! Public types for the device session.

use std::fmt;
use std::time::Duration;

use devlink_protocol::constants::{
    CHANNEL_MAX, CHANNEL_MIN, IDLE_BUDGET, RETRY_THRESHOLD, TICK_PERIOD,
};

/// Lifecycle of the single device connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection has been attempted yet.
    #[default]
    Idle,
    /// An attempt is outstanding; waiting for the transport to report.
    Connecting,
    /// Handshake completed, frames can be transmitted.
    Open,
    /// The transport reported the connection closed.
    Closed,
    /// The transport refused to even start an attempt.
    Failed,
}

impl ConnectionState {
    /// States from which a fresh attempt should be started.
    pub fn needs_open(self) -> bool {
        matches!(
            self,
            ConnectionState::Idle | ConnectionState::Closed | ConnectionState::Failed
        )
    }
}

/// Lifecycle callbacks delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Closed,
    Message(String),
    Error(String),
}

/// Severity of a status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// A status line for the display. The only user-visible failure signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub(crate) fn opening() -> Self {
        Self::info("Opening connection..")
    }

    pub(crate) fn retrying() -> Self {
        Self::error("Connection timeout, retrying..")
    }

    pub(crate) fn connected() -> Self {
        Self::info("CONNECTED")
    }

    pub(crate) fn disconnected() -> Self {
        Self::info("DISCONNECTED")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// What happened to a frame handed to [`ConnectionManager::send`].
///
/// Sends are fire-and-forget: nothing is queued or retried, and the
/// outcome only tells the caller which path was taken.
///
/// [`ConnectionManager::send`]: crate::ConnectionManager::send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the transport.
    Sent,
    /// The link was closed, failed or stale; a reconnect was requested
    /// instead of transmitting.
    Reconnecting,
    /// The link was not usable (idle or still connecting); frame discarded.
    Dropped(ConnectionState),
    /// The transport rejected the frame.
    Failed,
}

/// What a scheduler tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Idle budget exceeded; cursor rewound, nothing else done.
    IdleReset,
    /// Cursor is past the active range; waiting for a refresh.
    Paused,
    /// Connection is not open yet.
    NotOpen,
    /// Still inside the quiet window after the last poll.
    Quiet,
    /// A poll was handed to the connection manager.
    Polled(SendOutcome),
    /// The renderer had nothing to poll on this channel.
    Skipped,
}

/// Tunables for a session. Defaults match the device firmware's
/// expectations.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Attempts without a sign of life before a fresh connection is forced.
    pub retry_threshold: u32,
    /// Ticks before the channel cursor rewinds on an idle session.
    pub idle_budget: u32,
    /// Cursor value after a rewind.
    pub channel_min: i32,
    /// Highest cursor value that still polls.
    pub channel_max: i32,
    /// Ticks to hold off after each transmitted poll. Cleared by any reply.
    pub quiet_window: u32,
    /// Driver cadence.
    pub tick_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry_threshold: RETRY_THRESHOLD,
            idle_budget: IDLE_BUDGET,
            channel_min: CHANNEL_MIN,
            channel_max: CHANNEL_MAX,
            quiet_window: 0,
            tick_period: TICK_PERIOD,
        }
    }
}
