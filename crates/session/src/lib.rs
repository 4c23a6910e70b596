//! Session driver for a single polled device link.
//!
//! Keeps one WebSocket connection to the device alive, polls its channels
//! on a fixed tick, and hands every reply to a [`Renderer`].

pub mod connection;
pub mod driver;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod transport;
pub mod types;
pub mod ws_transport;

mod pumps {
    pub(crate) mod read;
    pub(crate) mod write;
}

#[cfg(test)]
mod test_support;

pub use connection::ConnectionManager;
pub use driver::{Command, SessionHandle};
pub use render::Renderer;
pub use scheduler::PollScheduler;
pub use session::Session;
pub use state::SessionState;
pub use transport::{Transport, TransportError};
pub use types::{
    ConnectionState, SendOutcome, SessionConfig, Status, StatusKind, TickOutcome, TransportEvent,
};
pub use ws_transport::WsTransport;
