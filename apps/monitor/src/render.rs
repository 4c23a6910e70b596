//! Console rendering of device values.

use std::collections::BTreeMap;

use devlink_protocol::constants::CHANNEL_MAX;
use devlink_protocol::{Device, DeviceRequest};
use devlink_session::{Renderer, Status, StatusKind};

/// Renders replies as log lines and sweeps one device's channel table.
///
/// The session cursor is an index into [`Device::channels`]; once the
/// table is exhausted the cursor parks past the polling range.
pub struct ConsoleRenderer {
    device: Device,
    values: BTreeMap<String, String>,
    controls: BTreeMap<String, String>,
    last_status: Option<Status>,
}

impl ConsoleRenderer {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            values: BTreeMap::new(),
            controls: BTreeMap::new(),
            last_status: None,
        }
    }

    /// Latest value per data point key.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Latest value per control key (`pwm[1]g`).
    pub fn controls(&self) -> &BTreeMap<String, String> {
        &self.controls
    }

    pub fn last_status(&self) -> Option<&Status> {
        self.last_status.as_ref()
    }

    /// Logs the final control states and link status once polling has stopped.
    pub fn log_summary(&self) {
        for (key, value) in &self.controls {
            tracing::info!(key, value, "final state");
        }
        tracing::info!(
            readings = self.values.len(),
            last_status = self.last_status.as_ref().map(|s| s.text.as_str()),
            "session summary"
        );
    }

    fn channel_at(&self, cursor: i32) -> Option<i32> {
        let index = usize::try_from(cursor).ok()?;
        self.device.channels().get(index).copied()
    }
}

impl Renderer for ConsoleRenderer {
    fn update_display_value(&mut self, key: &str, value: &str) {
        match DeviceRequest::parse_key(key) {
            Some((device, channel)) => {
                tracing::info!(%device, channel, value, "reading");
            }
            None => tracing::info!(key, value, "reading"),
        }
        self.values.insert(key.to_string(), value.to_string());
    }

    fn update_control_state(&mut self, key: &str, value: &str) {
        tracing::trace!(key, value, "control state");
        self.controls.insert(key.to_string(), value.to_string());
    }

    fn poll_request(&mut self, channel: i32) -> Option<String> {
        let channel = self.channel_at(channel)?;
        Some(DeviceRequest::read(self.device, channel).encode())
    }

    fn next_channel(&mut self, channel: i32) -> i32 {
        let next = channel + 1;
        if self.channel_at(next).is_some() {
            next
        } else {
            CHANNEL_MAX + 1
        }
    }

    fn show_status(&mut self, status: &Status) {
        // Per-poll chatter stays at debug; lifecycle changes are worth a line.
        match status.kind {
            StatusKind::Error => tracing::warn!(status = %status, "device link"),
            StatusKind::Info if status.text.starts_with("SENT:") => {
                tracing::debug!(status = %status, "device link")
            }
            StatusKind::Info if status.text.starts_with("RECEIVED:") => {
                tracing::debug!(status = %status, "device link")
            }
            StatusKind::Info => tracing::info!(status = %status, "device link"),
        }
        self.last_status = Some(status.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweeps_pwm_channels_then_parks() {
        let mut r = ConsoleRenderer::new(Device::Pwm);
        let mut cursor = 0;
        let mut requests = Vec::new();
        while cursor <= CHANNEL_MAX {
            requests.push(r.poll_request(cursor).unwrap());
            cursor = r.next_channel(cursor);
        }
        assert_eq!(requests.len(), 16);
        assert_eq!(requests[0], "pwm[0]=-1");
        assert_eq!(requests[15], "pwm[15]=-1");
        assert_eq!(cursor, CHANNEL_MAX + 1);
    }

    #[test]
    fn adc_sweep_includes_internal_channel() {
        let mut r = ConsoleRenderer::new(Device::Adc);
        let requests: Vec<String> = (0..5).filter_map(|c| r.poll_request(c)).collect();
        assert_eq!(
            requests,
            vec!["adc[0]=-1", "adc[1]=-1", "adc[2]=-1", "adc[3]=-1", "adc[-3]=-1"]
        );
        assert_eq!(r.next_channel(4), CHANNEL_MAX + 1);
    }

    #[test]
    fn dac_has_single_channel() {
        let mut r = ConsoleRenderer::new(Device::Dac);
        assert_eq!(r.poll_request(0).as_deref(), Some("dac[-2]=-1"));
        assert_eq!(r.next_channel(0), CHANNEL_MAX + 1);
        assert_eq!(r.poll_request(1), None);
    }

    #[test]
    fn negative_cursor_is_skipped() {
        let mut r = ConsoleRenderer::new(Device::Pwm);
        assert_eq!(r.poll_request(-1), None);
    }

    #[test]
    fn keeps_latest_values() {
        let mut r = ConsoleRenderer::new(Device::Pwm);
        r.update_display_value("pwm[1]", "10.00");
        r.update_display_value("pwm[1]", "12.50");
        r.update_control_state("pwm[1]g", "12.50");
        assert_eq!(r.values().get("pwm[1]").map(String::as_str), Some("12.50"));
        assert_eq!(r.values().len(), 1);
        assert_eq!(r.controls().get("pwm[1]g").map(String::as_str), Some("12.50"));
    }

    #[test]
    fn remembers_last_status() {
        let mut r = ConsoleRenderer::new(Device::Pwm);
        r.show_status(&Status::info("CONNECTED"));
        r.show_status(&Status::error("ERROR: refused"));
        let last = r.last_status().unwrap();
        assert_eq!(last.kind, StatusKind::Error);
        assert_eq!(last.text, "ERROR: refused");
    }
}
