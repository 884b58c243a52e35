//! Errors returned to the application.
//!
//! Interrupt handlers never return errors; they set buffer/engine flags that
//! `snapshot` turns into one of these.

/// Snapshot failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError {
    /// No session configured, or the sensor rejected the format.
    #[error("pixel format not configured or not supported")]
    InvalidPixelFormat,
    /// Geometry violates DMA constraints or exceeds a frame buffer.
    #[error("frame size invalid for DMA or frame buffer")]
    InvalidFrameSize,
    /// No completed frame before the deadline.
    #[error("timed out waiting for a frame")]
    CaptureTimeout,
    /// JPEG stream did not fit the frame buffer.
    #[error("JPEG frame larger than frame buffer")]
    JpegOverflow,
    /// No frame buffer available to arm the capture.
    #[error("no frame buffer available")]
    FramebufferError,
}

impl CaptureError {
    /// Short name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::InvalidPixelFormat => "InvalidPixelFormat",
            Self::InvalidFrameSize => "InvalidFrameSize",
            Self::CaptureTimeout => "CaptureTimeout",
            Self::JpegOverflow => "JpegOverflow",
            Self::FramebufferError => "FramebufferError",
        }
    }
}
