pub mod constants;
pub mod device;
pub mod frame;

// Re-export primary types for convenience.
pub use constants::endpoint_url;
pub use device::{Device, DeviceRequest, UnknownDevice};
pub use frame::{Frame, FrameError};
