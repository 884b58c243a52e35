//! Capture session parameters and the geometry derived from them.
//!
//! A session is fixed for the duration of a capture. [`SessionParams`] is what
//! the application asks for; [`Geometry`] is what the engine needs per line.

use platform::{FrameSize, GrayscaleSource, JpegFraming, PixelFormat, Window};

use crate::error::CaptureError;

/// What the application wants captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionParams {
    /// Output pixel format.
    pub format: PixelFormat,
    /// Sensor scan size. In JPEG mode the width is the framed line width in
    /// bytes.
    pub source: FrameSize,
    /// Crop window inside `source`.
    pub window: Window,
    /// Write the window rotated: output rows are source columns.
    pub transpose: bool,
    /// Pulse the frame-sync pin for each snapshot.
    pub frame_sync: bool,
    /// JPEG line framing; `None` for raw formats.
    pub jpeg_framing: JpegFraming,
    /// How grayscale arrives on the bus.
    pub grayscale_source: GrayscaleSource,
}

impl SessionParams {
    /// Full-frame capture of `source` in `format`.
    ///
    /// JPEG sessions default to 2-byte big-endian line framing.
    pub fn new(format: PixelFormat, source: FrameSize) -> Self {
        Self {
            format,
            source,
            window: Window::full(source),
            transpose: false,
            frame_sync: false,
            jpeg_framing: if format.is_jpeg() {
                JpegFraming::LengthPrefixed16
            } else {
                JpegFraming::None
            },
            grayscale_source: GrayscaleSource::default(),
        }
    }

    /// Crop to `window`.
    #[must_use]
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Rotate the output.
    #[must_use]
    pub fn with_transpose(mut self, transpose: bool) -> Self {
        self.transpose = transpose;
        self
    }

    /// Drive the frame-sync pin.
    #[must_use]
    pub fn with_frame_sync(mut self, frame_sync: bool) -> Self {
        self.frame_sync = frame_sync;
        self
    }

    /// Select the JPEG line framing.
    #[must_use]
    pub fn with_jpeg_framing(mut self, framing: JpegFraming) -> Self {
        self.jpeg_framing = framing;
        self
    }

    /// Select the grayscale bus encoding.
    #[must_use]
    pub fn with_grayscale_source(mut self, source: GrayscaleSource) -> Self {
        self.grayscale_source = source;
        self
    }

    /// Structural checks that need no hardware knowledge.
    ///
    /// JPEG needs a framing and takes the whole scan untransposed; raw
    /// formats take no framing and a window inside the scan.
    pub fn validate(&self) -> Result<(), CaptureError> {
        let jpeg = self.format.is_jpeg();
        if jpeg == (self.jpeg_framing == JpegFraming::None) {
            return Err(CaptureError::InvalidPixelFormat);
        }
        if jpeg && (self.transpose || self.window != Window::full(self.source)) {
            return Err(CaptureError::InvalidFrameSize);
        }
        if !self.window.fits_within(self.source) {
            return Err(CaptureError::InvalidFrameSize);
        }
        Ok(())
    }

    /// Derived per-line and per-frame sizes.
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self)
    }
}

/// Sizes derived from [`SessionParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    /// Bytes per pixel on the bus.
    pub src_bpp: usize,
    /// Bytes per pixel in the frame buffer.
    pub dst_bpp: usize,
    /// Bytes per DMA line transfer.
    pub line_bytes: usize,
    /// Crop origin column.
    pub crop_x: usize,
    /// Crop origin row.
    pub crop_y: usize,
    /// Window width (source columns copied per line).
    pub target_width: usize,
    /// Window height (source lines copied per frame).
    pub target_height: usize,
    /// Lines per frame on the bus.
    pub source_height: usize,
    /// Output image width (window height when transposed).
    pub out_width: u16,
    /// Output image height (window width when transposed).
    pub out_height: u16,
    /// Bytes per output row.
    pub dst_stride: usize,
    /// Bytes per raw output frame (0 for JPEG).
    pub frame_bytes: usize,
}

impl Geometry {
    fn new(params: &SessionParams) -> Self {
        let src_bpp = match params.format {
            PixelFormat::Grayscale => params.grayscale_source.source_bytes_per_pixel(),
            PixelFormat::Jpeg => 1,
            other => other.bytes_per_pixel(),
        };
        let dst_bpp = params.format.bytes_per_pixel();
        let w = params.window;
        let (out_width, out_height) = if params.transpose {
            (w.height, w.width)
        } else {
            (w.width, w.height)
        };
        let dst_stride = usize::from(out_width).saturating_mul(dst_bpp);
        Self {
            src_bpp,
            dst_bpp,
            line_bytes: usize::from(params.source.width()).saturating_mul(src_bpp),
            crop_x: usize::from(w.x),
            crop_y: usize::from(w.y),
            target_width: usize::from(w.width),
            target_height: usize::from(w.height),
            source_height: usize::from(params.source.height()),
            out_width,
            out_height,
            dst_stride,
            frame_bytes: dst_stride.saturating_mul(usize::from(out_height)),
        }
    }

    /// `true` when the source and destination pixel sizes differ (luma
    /// extraction).
    pub fn narrowing(&self) -> bool {
        self.src_bpp != self.dst_bpp
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_qvga_rgb565_geometry() {
        let g = SessionParams::new(PixelFormat::Rgb565, FrameSize::QVGA).geometry();
        assert_eq!(g.line_bytes, 640);
        assert_eq!(g.dst_stride, 640);
        assert_eq!(g.frame_bytes, 153_600);
        assert_eq!((g.out_width, g.out_height), (320, 240));
    }

    #[test]
    fn test_transposed_crop_geometry() {
        let p = SessionParams::new(PixelFormat::Rgb565, FrameSize::VGA)
            .with_window(Window::new(50, 40, 300, 200))
            .with_transpose(true);
        p.validate().unwrap();
        let g = p.geometry();
        assert_eq!((g.out_width, g.out_height), (200, 300));
        assert_eq!(g.dst_stride, 400);
        assert_eq!(g.frame_bytes, 300 * 200 * 2);
        assert_eq!(g.line_bytes, 1280);
    }

    #[test]
    fn test_grayscale_from_yuv_narrows() {
        let g = SessionParams::new(PixelFormat::Grayscale, FrameSize::QQVGA).geometry();
        assert_eq!(g.src_bpp, 2);
        assert_eq!(g.dst_bpp, 1);
        assert!(g.narrowing());
        assert_eq!(g.line_bytes, 320);

        let native = SessionParams::new(PixelFormat::Grayscale, FrameSize::QQVGA)
            .with_grayscale_source(GrayscaleSource::Native)
            .geometry();
        assert!(!native.narrowing());
    }

    #[test]
    fn test_validate_rejects_window_outside_scan() {
        let p = SessionParams::new(PixelFormat::Rgb565, FrameSize::QVGA)
            .with_window(Window::new(100, 0, 300, 10));
        assert_eq!(p.validate(), Err(CaptureError::InvalidFrameSize));
    }

    #[test]
    fn test_validate_framing_matches_format() {
        let raw = SessionParams::new(PixelFormat::Rgb565, FrameSize::QVGA)
            .with_jpeg_framing(JpegFraming::LengthPrefixed16);
        assert_eq!(raw.validate(), Err(CaptureError::InvalidPixelFormat));

        let jpeg = SessionParams::new(PixelFormat::Jpeg, FrameSize::QVGA)
            .with_jpeg_framing(JpegFraming::None);
        assert_eq!(jpeg.validate(), Err(CaptureError::InvalidPixelFormat));

        let jpeg = SessionParams::new(PixelFormat::Jpeg, FrameSize::QVGA).with_transpose(true);
        assert_eq!(jpeg.validate(), Err(CaptureError::InvalidFrameSize));
    }
}
