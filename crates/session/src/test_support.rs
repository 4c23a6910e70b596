//! Test doubles for the transport and renderer seams.

use crate::render::Renderer;
use crate::transport::{Transport, TransportError};
use crate::types::Status;

/// Transport that records calls instead of touching the network.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    pub opens: Vec<String>,
    pub sent: Vec<String>,
    pub closes: usize,
    pub fail_open: bool,
    pub fail_transmit: bool,
}

impl Transport for MockTransport {
    fn open(&mut self, url: &str) -> Result<(), TransportError> {
        if self.fail_open {
            return Err(TransportError::InvalidEndpoint(url.to_string()));
        }
        self.opens.push(url.to_string());
        Ok(())
    }

    fn transmit(&mut self, text: &str) -> Result<(), TransportError> {
        if self.fail_transmit {
            return Err(TransportError::Closed);
        }
        self.sent.push(text.to_string());
        Ok(())
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}

/// Renderer that records every hook invocation and polls `pwm[ch]=-1`,
/// advancing one channel per poll.
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub displays: Vec<(String, String)>,
    pub controls: Vec<(String, String)>,
    pub statuses: Vec<Status>,
    pub polled: Vec<i32>,
    pub skip_polls: bool,
}

impl RecordingRenderer {
    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(|s| s.text.as_str())
    }
}

impl Renderer for RecordingRenderer {
    fn update_display_value(&mut self, key: &str, value: &str) {
        self.displays.push((key.to_string(), value.to_string()));
    }

    fn update_control_state(&mut self, key: &str, value: &str) {
        self.controls.push((key.to_string(), value.to_string()));
    }

    fn poll_request(&mut self, channel: i32) -> Option<String> {
        self.polled.push(channel);
        if self.skip_polls {
            return None;
        }
        Some(format!("pwm[{channel}]=-1"))
    }

    fn next_channel(&mut self, channel: i32) -> i32 {
        channel + 1
    }

    fn show_status(&mut self, status: &Status) {
        self.statuses.push(status.clone());
    }
}
