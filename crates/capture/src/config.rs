//! Capture engine tuning.
//!
//! # Defaults
//!
//! | Field | Default | Notes |
//! |-------|---------|-------|
//! | `timeout_ms` | 3000 | Snapshot deadline; covers sensor start-up after arming |
//! | `max_fps` | 0 | 0 disables throttling |
//! | `copy_retries` | 3 | Extra `submit` attempts on accelerator `Busy` |
//! | `line_buffer_bytes` | 8192 | [`MAX_LINE_BUFFER_BYTES`] |
//! | `dma_align_bytes` | 4 | [`DMA_TRANSFER_ALIGN_BYTES`] |
//! | `invalidate_on_read` | true | D-cache invalidation on `acquire_read` |

use platform::dma_safety::{DMA_TRANSFER_ALIGN_BYTES, MAX_LINE_BUFFER_BYTES};

/// Invalid [`CaptureConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `timeout_ms` is zero.
    #[error("snapshot timeout must be non-zero")]
    ZeroTimeout,
    /// `dma_align_bytes` is zero or not a power of two.
    #[error("DMA alignment must be a power of two")]
    AlignmentNotPowerOfTwo,
    /// `line_buffer_bytes` is zero or not a multiple of the alignment.
    #[error("line buffer size must be a non-zero multiple of the DMA alignment")]
    LineBufferSize,
    /// `max_fps` above 1000 (sub-millisecond frame interval).
    #[error("frame-rate limit out of range")]
    FrameRateOutOfRange,
}

/// Capture engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureConfig {
    /// Snapshot deadline in milliseconds.
    pub timeout_ms: u32,
    /// Upper bound on accepted frames per second; 0 = unlimited.
    pub max_fps: u16,
    /// Extra copy attempts when the accelerator reports `Busy`.
    pub copy_retries: u8,
    /// Size of the DMA line buffer in bytes.
    pub line_buffer_bytes: usize,
    /// Required divisor of every line transfer.
    pub dma_align_bytes: usize,
    /// Request cache invalidation when the snapshot takes a frame.
    pub invalidate_on_read: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 3000,
            max_fps: 0,
            copy_retries: 3,
            line_buffer_bytes: MAX_LINE_BUFFER_BYTES,
            dma_align_bytes: DMA_TRANSFER_ALIGN_BYTES,
            invalidate_on_read: true,
        }
    }
}

impl CaptureConfig {
    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if !self.dma_align_bytes.is_power_of_two() {
            return Err(ConfigError::AlignmentNotPowerOfTwo);
        }
        if self.line_buffer_bytes == 0
            || self.line_buffer_bytes.checked_rem(self.dma_align_bytes) != Some(0)
        {
            return Err(ConfigError::LineBufferSize);
        }
        if self.max_fps > 1000 {
            return Err(ConfigError::FrameRateOutOfRange);
        }
        Ok(())
    }

    /// Minimum interval between accepted frames, `None` when unthrottled.
    pub fn frame_interval_ms(&self) -> Option<u64> {
        match self.max_fps {
            0 => None,
            fps => 1000u64.checked_div(u64::from(fps)),
        }
    }
}
