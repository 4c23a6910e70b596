use std::fmt;

use crate::constants::MAX_FRAME_SIZE;

/// Suffix appended to a data point's key to address its control element.
pub const CONTROL_KEY_SUFFIX: &str = "g";

/// Errors from decoding a text frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("frame has no '=' separator: {0:?}")]
    MissingSeparator(String),

    #[error("frame has an empty key")]
    EmptyKey,

    #[error("frame too large ({0} bytes)")]
    TooLarge(usize),
}

/// A single `key=value` text frame.
///
/// The key names a data point on the device; the value is opaque and is
/// handed to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub key: String,
    pub value: String,
}

impl Frame {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Decodes a frame, splitting on the first `=`.
    ///
    /// Everything after the first separator belongs to the value, so
    /// `a=b=c` yields key `a` and value `b=c`.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        if text.len() > MAX_FRAME_SIZE {
            return Err(FrameError::TooLarge(text.len()));
        }
        let (key, value) = text
            .split_once('=')
            .ok_or_else(|| FrameError::MissingSeparator(text.to_string()))?;
        if key.is_empty() {
            return Err(FrameError::EmptyKey);
        }
        Ok(Self::new(key, value))
    }

    /// Encodes the frame for the wire.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Key of the control element paired with this data point.
    pub fn control_key(&self) -> String {
        format!("{}{CONTROL_KEY_SUFFIX}", self.key)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl std::str::FromStr for Frame {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_pair() {
        let frame = Frame::parse("T1=23.5").unwrap();
        assert_eq!(frame.key, "T1");
        assert_eq!(frame.value, "23.5");
    }

    #[test]
    fn parse_splits_on_first_separator_only() {
        let frame = Frame::parse("expr=a=b").unwrap();
        assert_eq!(frame.key, "expr");
        assert_eq!(frame.value, "a=b");
    }

    #[test]
    fn parse_allows_empty_value() {
        let frame = Frame::parse("pio[2]=").unwrap();
        assert_eq!(frame.key, "pio[2]");
        assert!(frame.value.is_empty());
    }

    #[test]
    fn parse_rejects_missing_separator() {
        let err = Frame::parse("garbage").unwrap_err();
        assert_eq!(err, FrameError::MissingSeparator("garbage".into()));
    }

    #[test]
    fn parse_rejects_empty_key() {
        assert_eq!(Frame::parse("=5").unwrap_err(), FrameError::EmptyKey);
    }

    #[test]
    fn parse_rejects_oversized_frame() {
        let text = format!("k={}", "x".repeat(MAX_FRAME_SIZE));
        assert!(matches!(Frame::parse(&text), Err(FrameError::TooLarge(_))));
    }

    #[test]
    fn control_key_appends_suffix() {
        assert_eq!(Frame::new("T1", "23.5").control_key(), "T1g");
    }

    #[test]
    fn encode_matches_wire_form() {
        let frame: Frame = "adc[0]=12.55".parse().unwrap();
        assert_eq!(frame.encode(), "adc[0]=12.55");
    }

    #[test]
    fn frame_error_display() {
        assert_eq!(FrameError::EmptyKey.to_string(), "frame has an empty key");
        assert!(FrameError::TooLarge(9000).to_string().contains("9000"));
    }
}
