//! Camera application layer.
//!
//! # Architecture
//!
//! The capture driver calls a plain `fn` from interrupt context after every
//! completed frame. [`forward_frame_event`] is that function: it pushes a
//! [`FrameInfo`] into the static [`FRAME_EVENTS`] channel without blocking,
//! and [`FrameEvents`] wraps the receiving end for application tasks.
//!
//! # Overflow handling
//!
//! When the consumer falls behind and the channel is full, events are
//! dropped and counted; the frames themselves stay in the buffer ring and
//! are still reachable through `snapshot()`.

#[cfg(feature = "hardware")]
pub mod dcmi;

use core::sync::atomic::{AtomicU32, Ordering};

use capture::{CameraDriver, FrameInfo, SessionParams};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embedded_hal::digital::OutputPin;
use platform::{BufferRing, CopyAssist, CsiPeripheral, FrameSize, PixelFormat};

/// Depth of the frame-event channel.
pub const FRAME_EVENT_DEPTH: usize = 4;

// Written from the DCMI/DMA interrupt via try_send, read from thread mode.
// CriticalSectionRawMutex keeps each queue operation ISR-safe on the
// single-core Cortex-M7.
/// Completed-frame notifications.
pub static FRAME_EVENTS: Channel<CriticalSectionRawMutex, FrameInfo, FRAME_EVENT_DEPTH> =
    Channel::new();

static DROPPED_EVENTS: AtomicU32 = AtomicU32::new(0);

/// Frame-complete callback: queue `info` for the application.
///
/// Never blocks; a full channel drops the event.
pub fn forward_frame_event(info: &FrameInfo) {
    if FRAME_EVENTS.try_send(*info).is_err() {
        DROPPED_EVENTS.fetch_add(1, Ordering::Relaxed);
    }
}

/// Events lost to a full channel since boot.
pub fn dropped_events() -> u32 {
    DROPPED_EVENTS.load(Ordering::Relaxed)
}

/// Route `driver`'s frame-complete notifications into [`FRAME_EVENTS`].
pub fn register_frame_events<C, R, A, P>(driver: &CameraDriver<C, R, A, P>)
where
    C: CsiPeripheral,
    R: BufferRing,
    A: CopyAssist,
    P: OutputPin,
{
    driver.set_frame_complete_callback(forward_frame_event);
}

/// Receiving end of [`FRAME_EVENTS`].
pub struct FrameEvents {
    rx: Receiver<'static, CriticalSectionRawMutex, FrameInfo, FRAME_EVENT_DEPTH>,
}

impl FrameEvents {
    /// Receiver backed by the static channel.
    pub fn new() -> Self {
        Self {
            rx: FRAME_EVENTS.receiver(),
        }
    }

    /// Wait for the next completed frame.
    pub async fn next(&mut self) -> FrameInfo {
        self.rx.receive().await
    }

    /// Next queued event, if any.
    pub fn try_next(&mut self) -> Option<FrameInfo> {
        self.rx.try_receive().ok()
    }

    /// Discard queued events.
    pub fn clear(&mut self) {
        while self.rx.try_receive().is_ok() {}
    }
}

impl Default for FrameEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Session used at boot: QVGA RGB565, full window.
pub fn default_session() -> SessionParams {
    SessionParams::new(PixelFormat::Rgb565, FrameSize::QVGA)
}
