//! Interrupt-safe camera driver.
//!
//! Wraps a [`CaptureEngine`] in an `embassy_sync` blocking mutex so the
//! snapshot task and the DCMI interrupt handlers can share one `&'static`
//! driver. Every method takes `&self` and holds the lock only for the
//! duration of one engine call.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;
use embedded_hal::digital::OutputPin;
use platform::{BufferRing, CopyAssist, CsiPeripheral, NoPin, SensorControl};

use crate::config::{CaptureConfig, ConfigError};
use crate::engine::{CaptureEngine, CaptureState, CaptureStats, FrameCallback};
use crate::error::CaptureError;
use crate::session::SessionParams;

/// Camera driver shared between the application and interrupt handlers.
pub struct CameraDriver<C, R, A, P = NoPin> {
    engine: Mutex<CriticalSectionRawMutex, RefCell<CaptureEngine<C, R, A>>>,
    frame_sync: Mutex<CriticalSectionRawMutex, RefCell<P>>,
}

impl<C, R, A> CameraDriver<C, R, A, NoPin>
where
    C: CsiPeripheral,
    R: BufferRing,
    A: CopyAssist,
{
    /// Driver without a frame-sync pin.
    pub fn new(csi: C, ring: R, assist: A, config: CaptureConfig) -> Result<Self, ConfigError> {
        Self::with_frame_sync(csi, ring, assist, NoPin, config)
    }
}

impl<C, R, A, P> CameraDriver<C, R, A, P>
where
    C: CsiPeripheral,
    R: BufferRing,
    A: CopyAssist,
    P: OutputPin,
{
    /// Driver that raises `frame_sync` while a snapshot waits for a frame.
    pub fn with_frame_sync(
        csi: C,
        ring: R,
        assist: A,
        frame_sync: P,
        config: CaptureConfig,
    ) -> Result<Self, ConfigError> {
        let engine = CaptureEngine::new(csi, ring, assist, config)?;
        Ok(Self {
            engine: Mutex::new(RefCell::new(engine)),
            frame_sync: Mutex::new(RefCell::new(frame_sync)),
        })
    }

    /// Run `f` with exclusive access to the engine (interrupts masked).
    pub fn lock<T>(&self, f: impl FnOnce(&mut CaptureEngine<C, R, A>) -> T) -> T {
        self.engine.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Validate and store capture parameters.
    pub fn configure(&self, params: SessionParams) -> Result<(), CaptureError> {
        self.lock(|e| e.configure(params))
    }

    /// Register the handler called from interrupt context after every
    /// completed frame.
    pub fn set_frame_complete_callback(&self, callback: FrameCallback) {
        self.lock(|e| e.set_frame_complete_callback(Some(callback)));
    }

    /// Stop capturing and return every producer-side buffer to the ring.
    pub fn abort(&self) {
        self.lock(|e| e.abort(true));
    }

    /// Start-of-frame interrupt handler.
    pub fn on_start_of_frame(&self) {
        let now = Instant::now();
        self.lock(|e| e.start_of_frame(now));
    }

    /// Line-complete interrupt handler.
    pub fn on_line_ready(&self, line: &[u8]) {
        self.lock(|e| e.line_ready(line));
    }

    /// Counters.
    pub fn stats(&self) -> CaptureStats {
        self.lock(|e| e.stats())
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        self.lock(|e| e.state())
    }

    /// `true` while the peripheral is enabled.
    pub fn is_armed(&self) -> bool {
        self.lock(|e| e.is_armed())
    }

    /// Push the configured format and size to the sensor.
    ///
    /// Any running capture is aborted first. Sensor errors map to
    /// [`CaptureError::InvalidPixelFormat`] (reset, format) or
    /// [`CaptureError::InvalidFrameSize`] (size).
    pub async fn init_sensor<S: SensorControl>(&self, sensor: &mut S) -> Result<(), CaptureError> {
        let params = self
            .lock(|e| {
                e.abort(true);
                e.params()
            })
            .ok_or(CaptureError::InvalidPixelFormat)?;

        sensor
            .reset()
            .await
            .map_err(|_| CaptureError::InvalidPixelFormat)?;
        sensor
            .set_pixel_format(params.format)
            .await
            .map_err(|_| CaptureError::InvalidPixelFormat)?;
        sensor
            .set_frame_size(params.source)
            .await
            .map_err(|_| CaptureError::InvalidFrameSize)?;
        info!(
            "sensor set to {} {}x{}",
            params.format.name(),
            params.source.width(),
            params.source.height()
        );
        Ok(())
    }

    pub(crate) fn set_frame_sync(&self, active: bool) {
        self.frame_sync.lock(|cell| {
            let mut pin = cell.borrow_mut();
            let result = if active { pin.set_high() } else { pin.set_low() };
            if result.is_err() {
                warn!("frame-sync pin write failed");
            }
        });
    }
}
