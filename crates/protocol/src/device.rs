//! Device addressing for the `/dev` endpoint.
//!
//! The device exposes a small table of peripherals, each addressed as
//! `name[index]`. A request carries a value: a negative value reads the
//! current state back, anything else writes it first. The device answers
//! with the same key and the resulting value (`pwm[3]=42.00`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// Value sent to read a channel without changing it.
pub const READ_VALUE: f32 = -1.0;

/// Peripherals served by the device endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// PWM outputs, duty cycle in percent (channels 0-15).
    Pwm,
    /// GPIO expander pins (channels 0-15, -2 for the whole port).
    Pio,
    /// Analog inputs (channels 0-3, -3 for the on-chip ADC).
    Adc,
    /// Analog output, read back as percent (channel -2).
    Dac,
}

impl Device {
    pub const ALL: [Device; 4] = [Device::Pwm, Device::Pio, Device::Adc, Device::Dac];

    /// Channels worth polling on this device, in polling order.
    pub fn channels(self) -> &'static [i32] {
        const SIXTEEN: [i32; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];
        match self {
            Device::Pwm | Device::Pio => &SIXTEEN,
            Device::Adc => &[0, 1, 2, 3, -3],
            Device::Dac => &[-2],
        }
    }

    /// Three-letter name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Pwm => "pwm",
            Device::Pio => "pio",
            Device::Adc => "adc",
            Device::Dac => "dac",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = UnknownDevice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Device::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDevice(s.to_string()))
    }
}

/// A device name that is not in the device table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown device: {0:?}")]
pub struct UnknownDevice(pub String);

/// A read or write addressed to one device channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceRequest {
    pub device: Device,
    pub channel: i32,
    pub value: Option<f32>,
}

impl DeviceRequest {
    /// Reads a channel back.
    pub fn read(device: Device, channel: i32) -> Self {
        Self {
            device,
            channel,
            value: None,
        }
    }

    /// Writes a value to a channel; the device answers with the new state.
    pub fn write(device: Device, channel: i32, value: f32) -> Self {
        Self {
            device,
            channel,
            value: Some(value),
        }
    }

    /// Key this request (and its reply) is addressed by.
    pub fn key(&self) -> String {
        format!("{}[{}]", self.device, self.channel)
    }

    pub fn to_frame(&self) -> Frame {
        let value = self.value.unwrap_or(READ_VALUE);
        Frame::new(self.key(), value.to_string())
    }

    /// Wire text for this request.
    pub fn encode(&self) -> String {
        self.to_frame().encode()
    }

    /// Splits a reply key such as `adc[-3]` into device and channel.
    pub fn parse_key(key: &str) -> Option<(Device, i32)> {
        let (name, rest) = key.split_once('[')?;
        let index = rest.strip_suffix(']')?;
        let device = name.parse().ok()?;
        let channel = index.parse().ok()?;
        Some((device, channel))
    }
}

impl fmt::Display for DeviceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_frame().fmt(f)
    }
}
