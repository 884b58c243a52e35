//! Capture state machine.
//!
//! [`CaptureEngine`] owns the CSI peripheral, the buffer ring and the copy
//! accelerator. It is driven from two contexts:
//!
//! - interrupt context: [`start_of_frame`](CaptureEngine::start_of_frame) and
//!   [`line_ready`](CaptureEngine::line_ready)
//! - the snapshot task: [`arm`](CaptureEngine::arm),
//!   [`take_frame`](CaptureEngine::take_frame),
//!   [`abort`](CaptureEngine::abort)
//!
//! Callers serialize access (see `CameraDriver`); nothing here blocks.
//!
//! # States
//!
//! ```text
//!            arm                first line
//! Disabled ───────▶ Armed ─────────────────▶ Capturing
//!    ▲                ▲  ▲                      │ last line / EOI
//!    │ abort          │  │ SOF                  ▼
//!    └────────────────┤  └──────────────── FrameComplete
//!                     │ SOF                     │
//!                     └──────── Dropping ◀──────┘ (missed line, throttle)
//! ```
//!
//! While armed there is always an active buffer or the engine is dropping
//! lines (`Dropping` / `FrameComplete`) until the next start of frame.

use embassy_time::Instant;
use platform::dma_safety::line_transfer_is_legal;
use platform::{
    BufferHandle, BufferRing, CopyAssist, CsiConfig, CsiPeripheral, JpegFraming, PixelFormat,
    ReadFlags,
};

use crate::config::{CaptureConfig, ConfigError};
use crate::error::CaptureError;
use crate::jpeg::{self, AppendOutcome};
use crate::line_copy::{self, CopyPlan};
use crate::session::{Geometry, SessionParams};
use crate::snapshot::ImageInfo;

/// Where the engine is in the frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureState {
    /// Peripheral off; waiting for a snapshot to arm it.
    Disabled,
    /// Armed, waiting for the first line of a frame.
    Armed,
    /// Receiving lines into the active buffer.
    Capturing,
    /// A frame was handed off; lines are ignored until the next SOF.
    FrameComplete,
    /// The current frame is being discarded.
    Dropping,
}

impl CaptureState {
    /// Short name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Armed => "Armed",
            Self::Capturing => "Capturing",
            Self::FrameComplete => "FrameComplete",
            Self::Dropping => "Dropping",
        }
    }
}

/// Running counters since power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureStats {
    /// Frames handed to the consumer side.
    pub frames_completed: u32,
    /// Frames discarded (missed line, corrupt header, throttle).
    pub frames_dropped: u32,
    /// Lines received while dropping or without a buffer.
    pub lines_dropped: u32,
    /// JPEG frames that overflowed their buffer.
    pub jpeg_overflows: u32,
    /// Accelerator `Busy` retries.
    pub copy_retries: u32,
}

/// Passed to the frame-complete callback from interrupt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameInfo {
    /// Frame sequence number (wraps).
    pub sequence: u32,
    /// Buffer now queued for the consumer.
    pub handle: BufferHandle,
    /// Bytes written.
    pub bytes: usize,
    /// Pixel format.
    pub format: PixelFormat,
    /// Output width.
    pub width: u16,
    /// Output height.
    pub height: u16,
    /// The JPEG stream was truncated.
    pub jpeg_overflow: bool,
}

/// Frame-complete handler. Runs in interrupt context with the engine
/// locked: it must not call back into the driver.
pub type FrameCallback = fn(&FrameInfo);

#[derive(Debug, Clone, Copy)]
struct Session {
    params: SessionParams,
    geometry: Geometry,
}

/// The capture state machine.
pub struct CaptureEngine<C, R, A> {
    csi: C,
    ring: R,
    assist: A,
    config: CaptureConfig,
    session: Option<Session>,
    plan: Option<CopyPlan>,
    state: CaptureState,
    active: Option<BufferHandle>,
    last_frame: Option<Instant>,
    // Set when a SOF found no free buffer and disarmed; cleared by arm().
    starved: bool,
    sequence: u32,
    stats: CaptureStats,
    callback: Option<FrameCallback>,
}

impl<C, R, A> CaptureEngine<C, R, A>
where
    C: CsiPeripheral,
    R: BufferRing,
    A: CopyAssist,
{
    /// Create a disabled engine.
    pub fn new(csi: C, ring: R, assist: A, config: CaptureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            csi,
            ring,
            assist,
            config,
            session: None,
            plan: None,
            state: CaptureState::Disabled,
            active: None,
            last_frame: None,
            starved: false,
            sequence: 0,
            stats: CaptureStats::default(),
            callback: None,
        })
    }

    // ── Session ──────────────────────────────────────────────────────────────

    /// Validate and store the session. A running capture is aborted so the
    /// next snapshot re-arms with the new geometry.
    pub fn configure(&mut self, params: SessionParams) -> Result<(), CaptureError> {
        params.validate()?;
        if self.is_armed() {
            self.abort(true);
        }
        let geometry = params.geometry();
        self.session = Some(Session { params, geometry });
        self.plan = None;
        info!(
            "session: {} {}x{} transpose={}",
            params.format.name(),
            geometry.out_width,
            geometry.out_height,
            params.transpose
        );
        Ok(())
    }

    /// Current session parameters.
    pub fn params(&self) -> Option<SessionParams> {
        self.session.map(|s| s.params)
    }

    /// Geometry derived from the current session.
    pub fn geometry(&self) -> Option<Geometry> {
        self.session.map(|s| s.geometry)
    }

    /// Copy tuning chosen at the last arm.
    pub fn copy_plan(&self) -> Option<CopyPlan> {
        self.plan
    }

    /// Check that the session can be captured with this hardware: legal DMA
    /// line size and a frame that fits one buffer.
    pub fn check_capture(&self) -> Result<(), CaptureError> {
        let session = self.session.ok_or(CaptureError::InvalidPixelFormat)?;
        let g = session.geometry;
        if !line_transfer_is_legal(
            g.line_bytes,
            self.config.dma_align_bytes,
            self.config.line_buffer_bytes,
        ) {
            return Err(CaptureError::InvalidFrameSize);
        }
        let capacity = self.ring.buffer_capacity();
        let fits = if session.params.format.is_jpeg() {
            capacity > 0
        } else {
            g.frame_bytes <= capacity
        };
        if !fits {
            return Err(CaptureError::InvalidFrameSize);
        }
        Ok(())
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Configure the peripheral, take a buffer and start capturing.
    pub fn arm(&mut self) -> Result<(), CaptureError> {
        let session = self.session.ok_or(CaptureError::InvalidPixelFormat)?;
        self.check_capture()?;
        let handle = self
            .ring
            .acquire_write()
            .ok_or(CaptureError::FramebufferError)?;

        let g = session.geometry;
        let jpeg = session.params.format.is_jpeg();
        let csi_config = CsiConfig {
            line_bytes: g.line_bytes,
            lines_per_frame: if jpeg { 0 } else { g.source_height },
            jpeg,
        };
        self.csi.disable();
        if self.csi.configure(&csi_config).is_err() {
            self.ring.release(handle);
            warn!("CSI rejected {} byte lines", g.line_bytes);
            return Err(CaptureError::InvalidFrameSize);
        }
        if let Some(vb) = self.ring.buffer_mut(handle) {
            vb.reset();
        }

        self.plan = (!jpeg).then(|| {
            CopyPlan::new(
                &g,
                session.params.transpose,
                self.assist.max_width(),
                self.assist.min_chunk_bytes(),
            )
        });
        self.active = Some(handle);
        self.last_frame = None;
        self.starved = false;
        self.state = CaptureState::Armed;
        self.csi.set_interrupts(true);
        self.csi.set_dma_request(true);
        self.csi.enable();
        info!(
            "armed: {} byte lines, accelerated={}",
            g.line_bytes,
            self.plan.is_some_and(|p| p.accelerated)
        );
        Ok(())
    }

    /// Stop the peripheral and give buffers back.
    ///
    /// With `flush_all` the whole producer side of the ring is emptied,
    /// otherwise only the in-flight buffer is released. Safe to call in any
    /// state, any number of times.
    pub fn abort(&mut self, flush_all: bool) {
        self.csi.disable();
        self.csi.set_interrupts(false);
        self.csi.set_dma_request(false);
        let active = self.active.take();
        if flush_all {
            self.ring.flush_all(true);
        } else if let Some(handle) = active {
            self.ring.release(handle);
        }
        if self.state != CaptureState::Disabled {
            info!("capture aborted (flush={})", flush_all);
        }
        self.state = CaptureState::Disabled;
        self.last_frame = None;
    }

    // ── Interrupt entry points ───────────────────────────────────────────────

    /// Start-of-frame interrupt.
    pub fn start_of_frame(&mut self, now: Instant) {
        if !self.is_armed() {
            return;
        }
        let Some(handle) = self.ring.acquire_write() else {
            warn!("no frame buffer at SOF, disarming");
            self.abort(false);
            self.starved = true;
            return;
        };
        self.active = Some(handle);
        if let Some(vb) = self.ring.buffer_mut(handle) {
            if vb.offset != 0 {
                vb.reset_state = true;
            }
        }
        if self.throttled(now) {
            self.stats.frames_dropped = self.stats.frames_dropped.saturating_add(1);
            self.state = CaptureState::Dropping;
            trace!("frame throttled");
        } else {
            self.last_frame = Some(now);
            self.state = CaptureState::Armed;
        }
        self.csi.set_dma_request(true);
    }

    /// Line DMA complete: `line` is the whole line buffer.
    pub fn line_ready(&mut self, line: &[u8]) {
        if !self.is_armed() {
            return;
        }
        let Some(session) = self.session else {
            return;
        };
        match session.params.jpeg_framing {
            JpegFraming::None => self.raw_line(&session.geometry, line),
            framing => self.jpeg_line(framing, line),
        }
    }

    fn raw_line(&mut self, g: &Geometry, line: &[u8]) {
        let Some(handle) = self.active else {
            self.stats.lines_dropped = self.stats.lines_dropped.saturating_add(1);
            return;
        };
        let Some(vb) = self.ring.buffer_mut(handle) else {
            return;
        };
        if vb.reset_state {
            vb.reset();
        }

        if matches!(self.state, CaptureState::Dropping | CaptureState::FrameComplete) {
            vb.offset = vb.offset.saturating_add(1);
            self.stats.lines_dropped = self.stats.lines_dropped.saturating_add(1);
            if vb.offset >= g.target_height {
                vb.offset = 0;
                self.state = CaptureState::Armed;
                self.csi.set_dma_request(false);
                debug!("dropped frame drained, waiting for SOF");
            }
            return;
        }

        let row = vb.offset;
        let in_window = row >= g.crop_y && row < g.crop_y.saturating_add(g.target_height);
        if in_window {
            let Some(plan) = self.plan else {
                return;
            };
            let copied = line_copy::copy_line(
                &plan,
                &mut self.assist,
                self.config.copy_retries,
                line,
                row.saturating_sub(g.crop_y),
                vb.data_mut(),
            );
            match copied {
                Ok(spent) => {
                    self.stats.copy_retries = self.stats.copy_retries.saturating_add(u32::from(spent));
                }
                Err(_) => {
                    vb.offset = row.saturating_add(1);
                    self.state = CaptureState::Dropping;
                    self.stats.frames_dropped = self.stats.frames_dropped.saturating_add(1);
                    debug!("line {} not copied, dropping frame", row);
                    return;
                }
            }
        }

        self.state = CaptureState::Capturing;
        vb.offset = row.saturating_add(1);
        if vb.offset >= g.source_height {
            self.complete_frame(handle);
        }
    }

    fn jpeg_line(&mut self, framing: JpegFraming, line: &[u8]) {
        if self.is_dropping() {
            return;
        }
        let Some(handle) = self.active else {
            self.stats.lines_dropped = self.stats.lines_dropped.saturating_add(1);
            return;
        };
        let Some(vb) = self.ring.buffer_mut(handle) else {
            return;
        };
        if vb.reset_state {
            vb.reset();
        }
        let Ok(payload) = jpeg::split_chunk(framing, line) else {
            self.state = CaptureState::Dropping;
            self.stats.frames_dropped = self.stats.frames_dropped.saturating_add(1);
            debug!("corrupt JPEG line header, dropping frame");
            return;
        };
        self.state = CaptureState::Capturing;
        match jpeg::append(vb, payload) {
            AppendOutcome::Continue => {}
            AppendOutcome::EndOfImage => self.complete_frame(handle),
            AppendOutcome::Overflow => {
                warn!("JPEG overflow, {} byte buffer", self.ring.buffer_capacity());
                self.complete_frame(handle);
            }
        }
    }

    fn complete_frame(&mut self, handle: BufferHandle) {
        let Some(session) = self.session else {
            return;
        };
        let jpeg = session.params.format.is_jpeg();
        let (bytes, overflow) = self.ring.buffer(handle).map_or((0, false), |vb| {
            if jpeg {
                (vb.offset, vb.jpeg_overflow)
            } else {
                (session.geometry.frame_bytes, false)
            }
        });
        if !self.ring.complete_write(handle) {
            warn!("buffer {} was not being written", handle.index());
        }
        self.active = None;
        self.csi.set_dma_request(false);
        self.state = CaptureState::FrameComplete;
        self.sequence = self.sequence.wrapping_add(1);
        self.stats.frames_completed = self.stats.frames_completed.saturating_add(1);
        if overflow {
            self.stats.jpeg_overflows = self.stats.jpeg_overflows.saturating_add(1);
        }
        debug!("frame {} complete, {} bytes", self.sequence, bytes);

        if let Some(callback) = self.callback {
            callback(&FrameInfo {
                sequence: self.sequence,
                handle,
                bytes,
                format: session.params.format,
                width: session.geometry.out_width,
                height: session.geometry.out_height,
                jpeg_overflow: overflow,
            });
        }
    }

    fn throttled(&self, now: Instant) -> bool {
        let (Some(interval), Some(last)) = (self.config.frame_interval_ms(), self.last_frame) else {
            return false;
        };
        now.checked_duration_since(last)
            .is_some_and(|elapsed| elapsed.as_millis() < interval)
    }

    // ── Consumer side ────────────────────────────────────────────────────────

    /// Oldest completed frame, if any.
    pub fn take_frame(&mut self) -> Option<BufferHandle> {
        let flags = if self.config.invalidate_on_read {
            ReadFlags::INVALIDATE
        } else {
            ReadFlags::NONE
        };
        self.ring.acquire_read(flags)
    }

    /// Post-capture fix-ups for a frame returned by [`take_frame`](Self::take_frame).
    ///
    /// On error the buffer has already been released.
    pub fn finish_frame(&mut self, handle: BufferHandle) -> Result<ImageInfo, CaptureError> {
        let Some(session) = self.session else {
            self.ring.release(handle);
            return Err(CaptureError::InvalidPixelFormat);
        };
        let jpeg = session.params.format.is_jpeg();
        let checked = self.ring.buffer(handle).map(|vb| {
            if vb.jpeg_overflow {
                Err(CaptureError::JpegOverflow)
            } else if jpeg {
                Ok(jpeg::trim_to_eoi(vb.filled()))
            } else {
                Ok(session.geometry.frame_bytes)
            }
        });
        let len = match checked {
            Some(Ok(len)) => len,
            Some(Err(err)) => {
                self.ring.release(handle);
                return Err(err);
            }
            None => {
                self.ring.release(handle);
                return Err(CaptureError::FramebufferError);
            }
        };
        Ok(ImageInfo {
            width: session.geometry.out_width,
            height: session.geometry.out_height,
            format: session.params.format,
            len,
        })
    }

    /// Give a consumer buffer back to the ring.
    pub fn release_frame(&mut self, handle: BufferHandle) {
        self.ring.release(handle);
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// Register the frame-complete handler.
    pub fn set_frame_complete_callback(&mut self, callback: Option<FrameCallback>) {
        self.callback = callback;
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// `true` unless disabled.
    pub fn is_armed(&self) -> bool {
        self.state != CaptureState::Disabled
    }

    /// `true` if the last SOF disarmed the capture for lack of a free
    /// buffer. Cleared by the next [`arm`](Self::arm).
    pub fn is_starved(&self) -> bool {
        self.starved
    }

    /// `true` while lines are being discarded until the next SOF.
    pub fn is_dropping(&self) -> bool {
        matches!(
            self.state,
            CaptureState::Dropping | CaptureState::FrameComplete
        )
    }

    /// Numeric JPEG mode of the session (0 = raw).
    pub fn jpeg_mode(&self) -> u8 {
        self.session.map_or(0, |s| s.params.jpeg_framing.mode())
    }

    /// Buffer currently being written.
    pub fn active_buffer(&self) -> Option<BufferHandle> {
        self.active
    }

    /// Sequence number of the last completed frame.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Counters.
    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// Tuning.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// CSI peripheral.
    pub fn csi(&self) -> &C {
        &self.csi
    }

    /// CSI peripheral, mutable.
    pub fn csi_mut(&mut self) -> &mut C {
        &mut self.csi
    }

    /// Buffer ring.
    pub fn ring(&self) -> &R {
        &self.ring
    }

    /// Buffer ring, mutable.
    pub fn ring_mut(&mut self) -> &mut R {
        &mut self.ring
    }

    /// Copy accelerator.
    pub fn assist(&self) -> &A {
        &self.assist
    }

    /// Copy accelerator, mutable.
    pub fn assist_mut(&mut self) -> &mut A {
        &mut self.assist
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::indexing_slicing)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::pool::FramePool;
    use platform::mocks::{MockCsi, SyntheticSensor};
    use platform::{FrameSize, NoAssist};

    type Engine<'a> = CaptureEngine<MockCsi, FramePool<'a, 2>, NoAssist>;

    fn engine(mem: &mut [u8]) -> Engine<'_> {
        CaptureEngine::new(
            MockCsi::new(),
            FramePool::new(mem).unwrap(),
            NoAssist,
            CaptureConfig::default(),
        )
        .unwrap()
    }

    fn small() -> FrameSize {
        FrameSize::new(8, 4).unwrap()
    }

    #[test]
    fn test_line_before_arm_is_ignored() {
        let mut mem = vec![0u8; 256];
        let mut e = engine(&mut mem);
        e.configure(SessionParams::new(PixelFormat::Rgb565, small())).unwrap();
        e.start_of_frame(Instant::from_millis(0));
        e.line_ready(&[0u8; 16]);
        assert_eq!(e.state(), CaptureState::Disabled);
        assert_eq!(e.ring().free_count(), 2);
    }

    #[test]
    fn test_arm_enables_peripheral() {
        let mut mem = vec![0u8; 256];
        let mut e = engine(&mut mem);
        assert_eq!(e.arm(), Err(CaptureError::InvalidPixelFormat));
        e.configure(SessionParams::new(PixelFormat::Rgb565, small())).unwrap();
        e.arm().unwrap();
        assert_eq!(e.state(), CaptureState::Armed);
        assert!(e.csi().is_enabled());
        assert!(e.csi().interrupts_enabled());
        assert!(e.csi().dma_request_enabled());
        assert_eq!(e.csi().config().unwrap().line_bytes, 16);
        assert!(e.active_buffer().is_some());
    }

    #[test]
    fn test_full_frame_hand_off() {
        let mut mem = vec![0u8; 256];
        let mut e = engine(&mut mem);
        e.configure(SessionParams::new(PixelFormat::Rgb565, small())).unwrap();
        e.arm().unwrap();

        let mut sensor = SyntheticSensor::new(small(), 2);
        e.start_of_frame(Instant::from_millis(0));
        for line in sensor.frame_lines() {
            e.line_ready(&line);
        }
        assert_eq!(e.state(), CaptureState::FrameComplete);
        assert!(!e.csi().dma_request_enabled());
        assert_eq!(e.ring().ready_count(), 1);
        assert_eq!(e.stats().frames_completed, 1);
        assert_eq!(e.sequence(), 1);

        let h = e.take_frame().unwrap();
        let info = e.finish_frame(h).unwrap();
        assert_eq!(info.len, 64);
        let data = e.ring().buffer(h).unwrap().data();
        assert_eq!(data[0], SyntheticSensor::pixel_byte(0, 0, 0, 0));
        assert_eq!(data[63], SyntheticSensor::pixel_byte(0, 3, 7, 1));
    }

    #[test]
    fn test_lines_after_hand_off_are_ignored() {
        let mut mem = vec![0u8; 256];
        let mut e = engine(&mut mem);
        e.configure(SessionParams::new(PixelFormat::Rgb565, small())).unwrap();
        e.arm().unwrap();
        e.start_of_frame(Instant::from_millis(0));
        for _ in 0..4 {
            e.line_ready(&[1u8; 16]);
        }
        e.line_ready(&[1u8; 16]);
        assert_eq!(e.stats().lines_dropped, 1);
        assert_eq!(e.ring().ready_count(), 1);
    }

    #[test]
    fn test_abort_is_reentrant() {
        let mut mem = vec![0u8; 256];
        let mut e = engine(&mut mem);
        e.configure(SessionParams::new(PixelFormat::Rgb565, small())).unwrap();
        e.arm().unwrap();
        e.abort(false);
        e.abort(false);
        e.abort(true);
        assert_eq!(e.state(), CaptureState::Disabled);
        assert!(!e.csi().is_enabled());
        assert_eq!(e.ring().free_count(), 2);
    }

    #[test]
    fn test_sof_without_buffer_disarms() {
        let mut mem = vec![0u8; 64];
        let mut e = engine(&mut mem);
        e.configure(SessionParams::new(PixelFormat::Grayscale, small())).unwrap();
        e.arm().unwrap();
        // Frame 1 completes and the consumer holds it.
        e.start_of_frame(Instant::from_millis(0));
        for _ in 0..4 {
            e.line_ready(&[0u8; 16]);
        }
        let held = e.take_frame().unwrap();
        // Frame 2 completes; only one ready frame so nothing to recycle.
        e.start_of_frame(Instant::from_millis(10));
        for _ in 0..4 {
            e.line_ready(&[0u8; 16]);
        }
        assert!(!e.is_starved());
        e.start_of_frame(Instant::from_millis(20));
        assert_eq!(e.state(), CaptureState::Disabled);
        assert!(!e.csi().is_enabled());
        assert!(e.is_starved());
        e.release_frame(held);
        e.arm().unwrap();
        assert!(!e.is_starved());
    }

    #[test]
    fn test_throttle_drops_early_frames() {
        let mut mem = vec![0u8; 256];
        let config = CaptureConfig {
            max_fps: 10,
            ..CaptureConfig::default()
        };
        let mut e: Engine<'_> = CaptureEngine::new(
            MockCsi::new(),
            FramePool::new(&mut mem).unwrap(),
            NoAssist,
            config,
        )
        .unwrap();
        e.configure(SessionParams::new(PixelFormat::Rgb565, small())).unwrap();
        e.arm().unwrap();

        e.start_of_frame(Instant::from_millis(1000));
        assert_eq!(e.state(), CaptureState::Armed);
        e.start_of_frame(Instant::from_millis(1050));
        assert_eq!(e.state(), CaptureState::Dropping);
        assert_eq!(e.stats().frames_dropped, 1);
        e.start_of_frame(Instant::from_millis(1100));
        assert_eq!(e.state(), CaptureState::Armed);
    }

    #[test]
    fn test_jpeg_mode_numbers() {
        let mut mem = vec![0u8; 256];
        let mut e = engine(&mut mem);
        assert_eq!(e.jpeg_mode(), 0);
        e.configure(
            SessionParams::new(PixelFormat::Jpeg, FrameSize::new(16, 4).unwrap())
                .with_jpeg_framing(JpegFraming::LengthPrefixed24),
        )
        .unwrap();
        assert_eq!(e.jpeg_mode(), 2);
    }
}
