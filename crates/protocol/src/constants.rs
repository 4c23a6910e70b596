use std::time::Duration;

/// Fixed cadence of the poll scheduler.
pub const TICK_PERIOD: Duration = Duration::from_millis(200);

/// Consecutive attempts without a sign of life before a fresh connection
/// is forced.
pub const RETRY_THRESHOLD: u32 = 70;

/// Ticks after which the session is presumed idle and the channel cursor
/// rewinds (48 seconds at the default cadence).
pub const IDLE_BUDGET: u32 = 240;

/// First channel polled after a refresh.
pub const CHANNEL_MIN: i32 = 0;

/// Last channel polled while polling is active. Any cursor past this
/// pauses polling until a refresh.
pub const CHANNEL_MAX: i32 = 15;

/// Path the device serves its polling endpoint on.
pub const DEVICE_PATH: &str = "/dev";

/// Largest text frame accepted from the device.
///
/// Device replies are tiny (`pwm[3]=42.00`); anything beyond this is noise.
pub const MAX_FRAME_SIZE: usize = 4096;

/// Upper bound on a single connection attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the WebSocket endpoint for a device host (`host` or `host:port`).
pub fn endpoint_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    format!("ws://{host}{DEVICE_PATH}")
}
