//! Camera serial interface (CSI) peripheral abstraction
//!
//! The capture engine only needs enable/disable, interrupt masking and the
//! DMA request gate. Line data reaches the engine through
//! `CameraDriver::on_line_ready`, called by whatever owns the line DMA.

/// Peripheral configuration applied when a capture is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CsiConfig {
    /// Bytes per DMA line transfer.
    pub line_bytes: usize,
    /// Lines per frame as seen on the bus (0 for JPEG).
    pub lines_per_frame: usize,
    /// JPEG mode: the sensor sends a compressed, line-framed stream.
    pub jpeg: bool,
}

/// CSI peripheral control.
pub trait CsiPeripheral {
    /// Error type
    type Error: core::fmt::Debug;

    /// Program line size and mode. Called with the peripheral disabled.
    fn configure(&mut self, config: &CsiConfig) -> Result<(), Self::Error>;

    /// Start accepting frames.
    fn enable(&mut self);

    /// Stop accepting frames. Idempotent.
    fn disable(&mut self);

    /// Unmask or mask the SOF and line interrupts.
    fn set_interrupts(&mut self, enabled: bool);

    /// Open or close the DMA request line for subsequent lines.
    fn set_dma_request(&mut self, enabled: bool);

    /// `true` while enabled.
    fn is_enabled(&self) -> bool;
}
