//! Image sensor control abstraction
//!
//! Only used at initialization, before a capture is armed. The register
//! protocol (SCCB/I2C) lives behind the implementation.

use crate::pixel::{FrameSize, PixelFormat};

/// Sensor control operations.
pub trait SensorControl {
    /// Error type
    type Error: core::fmt::Debug;

    /// Soft-reset the sensor to its power-on register set.
    async fn reset(&mut self) -> Result<(), Self::Error>;

    /// Select the output pixel format.
    async fn set_pixel_format(&mut self, format: PixelFormat) -> Result<(), Self::Error>;

    /// Select the scan size.
    async fn set_frame_size(&mut self, size: FrameSize) -> Result<(), Self::Error>;
}
