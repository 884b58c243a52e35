//! Pixel-format and frame-geometry newtypes.
//!
//! These are the only "schema" shared between the application, the capture
//! core and the sensor driver, and they are always passed by value.
//!
//! - `PixelFormat`: what the application receives
//! - `GrayscaleSource`: how the sensor delivers grayscale (native 8-bit or YUV)
//! - `JpegFraming`: per-vendor JPEG-over-lines framing convention
//! - `FrameSize`: validated sensor scan size
//! - `Window`: crop origin + target size inside a `FrameSize`

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("value {value} outside {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── PixelFormat ──────────────────────────────────────────────────────────────

/// Pixel format of the image handed to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    /// 8-bit luma.
    Grayscale,
    /// 16-bit RGB 5-6-5, sensor byte order.
    Rgb565,
    /// 16-bit YUYV 4:2:2.
    Yuv422,
    /// 8-bit raw Bayer mosaic.
    Bayer,
    /// Variable-length JPEG stream.
    Jpeg,
}

impl PixelFormat {
    /// Bytes per pixel in the destination image (0 for JPEG).
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Grayscale | Self::Bayer => 1,
            Self::Rgb565 | Self::Yuv422 => 2,
            Self::Jpeg => 0,
        }
    }

    /// `true` for compressed formats whose size is only known after capture.
    pub const fn is_jpeg(self) -> bool {
        matches!(self, Self::Jpeg)
    }

    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grayscale => "GRAYSCALE",
            Self::Rgb565 => "RGB565",
            Self::Yuv422 => "YUV422",
            Self::Bayer => "BAYER",
            Self::Jpeg => "JPEG",
        }
    }
}

// ── GrayscaleSource ──────────────────────────────────────────────────────────

/// How the sensor delivers grayscale data on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GrayscaleSource {
    /// One byte of luma per pixel.
    Native,
    /// YUYV 4:2:2; luma is the first byte of every pixel pair.
    #[default]
    YuvLuma,
}

impl GrayscaleSource {
    /// Bytes per pixel on the bus.
    pub const fn source_bytes_per_pixel(self) -> usize {
        match self {
            Self::Native => 1,
            Self::YuvLuma => 2,
        }
    }
}

// ── JpegFraming ──────────────────────────────────────────────────────────────

/// JPEG-over-fixed-width-lines framing convention.
///
/// Sensors in "line framed" JPEG mode pad every scanline to the configured
/// width and prefix the valid payload with its length.
///
/// | Mode | Header | Length encoding |
/// |------|--------|-----------------|
/// | 0    | none   | not JPEG        |
/// | 1    | 2 bytes | u16 big-endian (OV2640 / OV5640) |
/// | 2    | 4 bytes | low 24 bits of a u32 little-endian (MT9M114) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JpegFraming {
    /// Raw pixel capture.
    #[default]
    None,
    /// 2-byte big-endian length prefix.
    LengthPrefixed16,
    /// 24-bit little-endian length in a 4-byte header.
    LengthPrefixed24,
}

impl JpegFraming {
    /// Numeric `jpeg_mode` (0 = not JPEG).
    pub const fn mode(self) -> u8 {
        match self {
            Self::None => 0,
            Self::LengthPrefixed16 => 1,
            Self::LengthPrefixed24 => 2,
        }
    }

    /// Inverse of [`mode`](Self::mode).
    pub const fn from_mode(mode: u8) -> Option<Self> {
        match mode {
            0 => Some(Self::None),
            1 => Some(Self::LengthPrefixed16),
            2 => Some(Self::LengthPrefixed24),
            _ => None,
        }
    }

    /// Size of the per-line header in bytes.
    pub const fn header_len(self) -> usize {
        match self {
            Self::None => 0,
            Self::LengthPrefixed16 => 2,
            Self::LengthPrefixed24 => 4,
        }
    }
}

// ── FrameSize ────────────────────────────────────────────────────────────────

/// Sensor scan size in pixels, validated to `1..=MAX_DIMENSION` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameSize {
    width: u16,
    height: u16,
}

impl FrameSize {
    /// Largest supported width or height.
    pub const MAX_DIMENSION: u16 = 4096;

    /// 160×120.
    pub const QQVGA: Self = Self::raw(160, 120);
    /// 320×240.
    pub const QVGA: Self = Self::raw(320, 240);
    /// 640×480.
    pub const VGA: Self = Self::raw(640, 480);
    /// 800×600.
    pub const SVGA: Self = Self::raw(800, 600);
    /// 1280×720.
    pub const HD: Self = Self::raw(1280, 720);

    const fn raw(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Create a `FrameSize`, rejecting zero or oversized dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] for the first offending dimension.
    pub fn new(width: u16, height: u16) -> Result<Self, OutOfRangeError> {
        for value in [width, height] {
            if value == 0 || value > Self::MAX_DIMENSION {
                return Err(OutOfRangeError {
                    value: u32::from(value),
                    min: 1,
                    max: u32::from(Self::MAX_DIMENSION),
                });
            }
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    pub const fn width(self) -> u16 {
        self.width
    }

    /// Height in pixels.
    pub const fn height(self) -> u16 {
        self.height
    }

    /// Total pixel count.
    pub fn pixels(self) -> usize {
        usize::from(self.width).saturating_mul(usize::from(self.height))
    }
}

// ── Window ───────────────────────────────────────────────────────────────────

/// Crop window: origin inside the sensor scan plus the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    /// Left edge (column) in sensor pixels.
    pub x: u16,
    /// Top edge (row) in sensor lines.
    pub y: u16,
    /// Target width in pixels.
    pub width: u16,
    /// Target height in lines.
    pub height: u16,
}

impl Window {
    /// Window covering the whole frame.
    pub const fn full(size: FrameSize) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }

    /// Window with the given origin and size.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `true` when the window is non-empty and lies entirely inside `size`.
    pub fn fits_within(&self, size: FrameSize) -> bool {
        let right = u32::from(self.x).saturating_add(u32::from(self.width));
        let bottom = u32::from(self.y).saturating_add(u32::from(self.height));
        self.width != 0
            && self.height != 0
            && right <= u32::from(size.width)
            && bottom <= u32::from(size.height)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_rejects_zero() {
        assert!(FrameSize::new(0, 240).is_err());
        assert!(FrameSize::new(320, 0).is_err());
    }

    #[test]
    fn test_frame_size_rejects_oversize() {
        let err = FrameSize::new(5000, 10).unwrap_err();
        assert_eq!(err.value, 5000);
        assert_eq!(err.max, 4096);
    }

    #[test]
    fn test_presets_match_new() {
        assert_eq!(FrameSize::new(320, 240).unwrap(), FrameSize::QVGA);
        assert_eq!(FrameSize::VGA.pixels(), 640 * 480);
    }

    #[test]
    fn test_window_fits() {
        assert!(Window::new(50, 40, 300, 200).fits_within(FrameSize::VGA));
        assert!(Window::full(FrameSize::VGA).fits_within(FrameSize::VGA));
        assert!(!Window::new(400, 0, 300, 10).fits_within(FrameSize::VGA));
        assert!(!Window::new(0, 0, 0, 10).fits_within(FrameSize::VGA));
    }

    #[test]
    fn test_jpeg_mode_round_trip() {
        for framing in [
            JpegFraming::None,
            JpegFraming::LengthPrefixed16,
            JpegFraming::LengthPrefixed24,
        ] {
            assert_eq!(JpegFraming::from_mode(framing.mode()), Some(framing));
        }
        assert_eq!(JpegFraming::from_mode(9), None);
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::Rgb565.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::Grayscale.bytes_per_pixel(), 1);
        assert_eq!(GrayscaleSource::YuvLuma.source_bytes_per_pixel(), 2);
        assert!(PixelFormat::Jpeg.is_jpeg());
    }
}
