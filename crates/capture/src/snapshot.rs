//! Snapshot: arm, wait for a frame, hand it to the application.

use embassy_futures::yield_now;
use embassy_time::{Duration, Instant};
use embedded_hal::digital::OutputPin;
use platform::{BufferHandle, BufferRing, CopyAssist, CsiPeripheral, PixelFormat};

use crate::driver::CameraDriver;
use crate::error::CaptureError;

/// Largest slice [`Image::copy_to`] moves under one driver lock.
pub const COPY_CHUNK_BYTES: usize = 512;

/// Description of a captured image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageInfo {
    /// Width in pixels (window height when transposed).
    pub width: u16,
    /// Height in pixels (window width when transposed).
    pub height: u16,
    /// Pixel format.
    pub format: PixelFormat,
    /// Valid bytes; JPEG is trimmed to the end-of-image marker.
    pub len: usize,
}

/// A captured frame, owned by the application until dropped.
///
/// The underlying buffer is in the ring's consumer state; the interrupt
/// handlers never touch it. Dropping the image releases it.
pub struct Image<'d, C, R, A, P>
where
    C: CsiPeripheral,
    R: BufferRing,
    A: CopyAssist,
    P: OutputPin,
{
    driver: &'d CameraDriver<C, R, A, P>,
    handle: BufferHandle,
    info: ImageInfo,
}

impl<C, R, A, P> Image<'_, C, R, A, P>
where
    C: CsiPeripheral,
    R: BufferRing,
    A: CopyAssist,
    P: OutputPin,
{
    /// Size and format.
    pub fn info(&self) -> ImageInfo {
        self.info
    }

    /// Ring buffer holding the image.
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// Run `f` over the image bytes.
    ///
    /// `f` runs inside the driver's critical section, which masks the line
    /// interrupt; keep it short or use [`copy_to`](Self::copy_to).
    pub fn with_data<T>(&self, f: impl FnOnce(&[u8]) -> T) -> T {
        let len = self.info.len;
        let handle = self.handle;
        self.driver.lock(|e| {
            let data = e.ring().buffer(handle).map_or(&[][..], |vb| vb.data());
            f(data.get(..len).unwrap_or(data))
        })
    }

    /// Copy the image into `out`; returns the bytes copied.
    pub fn copy_to(&self, out: &mut [u8]) -> usize {
        self.read_at(0, out)
    }

    /// Copy image bytes starting at `offset` into `out`; returns the bytes
    /// copied, 0 past the end.
    ///
    /// The copy takes the driver lock once per [`COPY_CHUNK_BYTES`], so a
    /// running capture still sees its line interrupts between chunks.
    pub fn read_at(&self, offset: usize, out: &mut [u8]) -> usize {
        let end = self.info.len.min(offset.saturating_add(out.len()));
        let mut pos = offset;
        while pos < end {
            let chunk_end = pos.saturating_add(COPY_CHUNK_BYTES).min(end);
            let dst_start = pos.saturating_sub(offset);
            let dst_end = chunk_end.saturating_sub(offset);
            let Some(dst) = out.get_mut(dst_start..dst_end) else {
                break;
            };
            let n = self.copy_chunk(pos, dst);
            if n == 0 {
                break;
            }
            pos = pos.saturating_add(n);
        }
        pos.saturating_sub(offset)
    }

    fn copy_chunk(&self, offset: usize, dst: &mut [u8]) -> usize {
        let handle = self.handle;
        self.driver.lock(|e| {
            let data = e.ring().buffer(handle).map_or(&[][..], |vb| vb.data());
            let src = data.get(offset..).unwrap_or(&[]);
            let n = src.len().min(dst.len());
            match (dst.get_mut(..n), src.get(..n)) {
                (Some(d), Some(s)) => {
                    d.copy_from_slice(s);
                    n
                }
                _ => 0,
            }
        })
    }
}

impl<C, R, A, P> Drop for Image<'_, C, R, A, P>
where
    C: CsiPeripheral,
    R: BufferRing,
    A: CopyAssist,
    P: OutputPin,
{
    fn drop(&mut self) {
        let handle = self.handle;
        self.driver.lock(|e| e.release_frame(handle));
    }
}

impl<C, R, A, P> CameraDriver<C, R, A, P>
where
    C: CsiPeripheral,
    R: BufferRing,
    A: CopyAssist,
    P: OutputPin,
{
    /// Capture one frame.
    ///
    /// Arms the capture if needed, then yields to the executor until the
    /// interrupt handlers complete a frame or the configured timeout
    /// expires. A timeout disables the peripheral and flushes the ring;
    /// buffers already handed to the application are left alone. If the
    /// ring runs out of free buffers while waiting, the capture disarms and
    /// the call fails at once with [`CaptureError::FramebufferError`].
    pub async fn snapshot(&self) -> Result<Image<'_, C, R, A, P>, CaptureError> {
        let (frame_sync, timeout_ms) = self.lock(|e| {
            let params = e.params().ok_or(CaptureError::InvalidPixelFormat)?;
            e.check_capture()?;
            if !e.is_armed() {
                e.arm()?;
            }
            Ok::<_, CaptureError>((params.frame_sync, e.config().timeout_ms))
        })?;

        if frame_sync {
            self.set_frame_sync(true);
        }
        let deadline = Instant::now()
            .checked_add(Duration::from_millis(u64::from(timeout_ms)))
            .unwrap_or(Instant::MAX);

        let handle = loop {
            let (frame, starved) = self.lock(|e| (e.take_frame(), e.is_starved()));
            if let Some(handle) = frame {
                break handle;
            }
            if starved {
                // The SOF handler already disarmed and released its buffer.
                if frame_sync {
                    self.set_frame_sync(false);
                }
                warn!("snapshot: frame pool exhausted");
                return Err(CaptureError::FramebufferError);
            }
            if Instant::now() >= deadline {
                self.lock(|e| e.abort(true));
                if frame_sync {
                    self.set_frame_sync(false);
                }
                warn!("snapshot timed out after {} ms", timeout_ms);
                return Err(CaptureError::CaptureTimeout);
            }
            yield_now().await;
        };
        if frame_sync {
            self.set_frame_sync(false);
        }

        let info = self.lock(|e| e.finish_frame(handle)).map_err(|err| {
            warn!("snapshot failed: {}", err.name());
            err
        })?;
        debug!(
            "snapshot {}x{} {} bytes",
            info.width,
            info.height,
            info.len
        );
        Ok(Image {
            driver: self,
            handle,
            info,
        })
    }
}
