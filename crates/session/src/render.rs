//! Hooks into the display layer.

use crate::types::Status;

/// The rendering collaborator driven by the session.
///
/// Formatting of values, layout and the meaning of channels all live on
/// this side; the session only moves keys, values and channel numbers.
pub trait Renderer {
    /// Shows a received value under its data point key.
    fn update_display_value(&mut self, key: &str, value: &str);

    /// Reflects a received value on the control paired with a data point.
    /// `key` is already the derived control key.
    fn update_control_state(&mut self, key: &str, value: &str);

    /// Formats the poll request for a channel, or `None` to skip it.
    fn poll_request(&mut self, channel: i32) -> Option<String>;

    /// Channel to poll after `channel`.
    fn next_channel(&mut self, channel: i32) -> i32;

    /// Shows a connection status line.
    fn show_status(&mut self, _status: &Status) {}
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn update_display_value(&mut self, key: &str, value: &str) {
        (**self).update_display_value(key, value)
    }

    fn update_control_state(&mut self, key: &str, value: &str) {
        (**self).update_control_state(key, value)
    }

    fn poll_request(&mut self, channel: i32) -> Option<String> {
        (**self).poll_request(channel)
    }

    fn next_channel(&mut self, channel: i32) -> i32 {
        (**self).next_channel(channel)
    }

    fn show_status(&mut self, status: &Status) {
        (**self).show_status(status)
    }
}
