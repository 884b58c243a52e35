//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests, plus a synthetic sensor that
//! produces deterministic raw and JPEG line data.

#![cfg(any(test, feature = "std"))]
// Host-only test scaffolding: arithmetic and indexing are bounded by the
// synthetic frame sizes.
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::cast_possible_truncation)]

use crate::*;
use std::vec::Vec;

// ── MockCsi ──────────────────────────────────────────────────────────────────

/// Mock CSI peripheral recording every control call.
#[derive(Debug, Default)]
pub struct MockCsi {
    enabled: bool,
    interrupts: bool,
    dma_request: bool,
    config: Option<CsiConfig>,
    configure_calls: usize,
    enable_calls: usize,
    disable_calls: usize,
    fail_configure: bool,
}

/// Error returned by [`MockCsi::configure`] when told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockCsiError;

impl MockCsi {
    /// Create new mock CSI (disabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `configure` fail.
    pub fn fail_configure(&mut self, fail: bool) {
        self.fail_configure = fail;
    }

    /// Interrupts unmasked.
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts
    }

    /// DMA request line open.
    pub fn dma_request_enabled(&self) -> bool {
        self.dma_request
    }

    /// Last applied configuration.
    pub fn config(&self) -> Option<CsiConfig> {
        self.config
    }

    /// Number of `configure` calls.
    pub fn configure_calls(&self) -> usize {
        self.configure_calls
    }

    /// Number of `enable` calls.
    pub fn enable_calls(&self) -> usize {
        self.enable_calls
    }

    /// Number of `disable` calls.
    pub fn disable_calls(&self) -> usize {
        self.disable_calls
    }
}

impl CsiPeripheral for MockCsi {
    type Error = MockCsiError;

    fn configure(&mut self, config: &CsiConfig) -> Result<(), Self::Error> {
        self.configure_calls += 1;
        if self.fail_configure {
            return Err(MockCsiError);
        }
        self.config = Some(*config);
        Ok(())
    }

    fn enable(&mut self) {
        self.enable_calls += 1;
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.disable_calls += 1;
        self.enabled = false;
    }

    fn set_interrupts(&mut self, enabled: bool) {
        self.interrupts = enabled;
    }

    fn set_dma_request(&mut self, enabled: bool) {
        self.dma_request = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// ── MockCopyAssist ───────────────────────────────────────────────────────────

/// Mock copy accelerator.
///
/// Executes jobs with the CPU copy, after checking that every offset and
/// increment is a multiple of the requested beat width, the way a real
/// DMA engine faults on misaligned addresses.
#[derive(Debug)]
pub struct MockCopyAssist {
    max_width: TransferWidth,
    min_chunk: usize,
    busy_remaining: usize,
    always_busy: bool,
    submits: usize,
    completed: usize,
    last_width: Option<TransferWidth>,
}

impl MockCopyAssist {
    /// Accelerator with the given widest beat and minimum chunk.
    pub fn new(max_width: TransferWidth, min_chunk: usize) -> Self {
        Self {
            max_width,
            min_chunk,
            busy_remaining: 0,
            always_busy: false,
            submits: 0,
            completed: 0,
            last_width: None,
        }
    }

    /// Report `Busy` for the next `n` submissions.
    pub fn busy_for(&mut self, n: usize) {
        self.busy_remaining = n;
    }

    /// Report `Busy` for every submission.
    pub fn always_busy(&mut self, busy: bool) {
        self.always_busy = busy;
    }

    /// Total `submit` calls.
    pub fn submits(&self) -> usize {
        self.submits
    }

    /// Jobs that were executed.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Beat width of the last executed job.
    pub fn last_width(&self) -> Option<TransferWidth> {
        self.last_width
    }
}

impl CopyAssist for MockCopyAssist {
    fn max_width(&self) -> TransferWidth {
        self.max_width
    }

    fn min_chunk_bytes(&self) -> usize {
        self.min_chunk
    }

    fn submit(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        job: &StridedCopy,
    ) -> Result<(), CopyAssistError> {
        self.submits += 1;
        if self.always_busy {
            return Err(CopyAssistError::Busy);
        }
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            return Err(CopyAssistError::Busy);
        }
        let w = job.width.bytes();
        let aligned = [
            job.src_offset,
            job.dst_offset,
            job.element_bytes,
            job.src_increment,
            job.dst_increment,
        ]
        .iter()
        .all(|v| v % w == 0);
        if job.width > self.max_width || !aligned {
            return Err(CopyAssistError::Unsupported);
        }
        job.copy_bytewise(src, dst)?;
        self.completed += 1;
        self.last_width = Some(job.width);
        Ok(())
    }
}

// ── MockSensor ───────────────────────────────────────────────────────────────

/// Error returned by [`MockSensor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSensorError {
    /// Format rejected.
    UnsupportedFormat,
    /// Size rejected.
    UnsupportedSize,
}

/// Mock sensor accepting everything except the formats and sizes it is told
/// to reject.
#[derive(Debug, Default)]
pub struct MockSensor {
    resets: usize,
    format: Option<PixelFormat>,
    size: Option<FrameSize>,
    reject_format: Option<PixelFormat>,
    reject_size: Option<FrameSize>,
}

impl MockSensor {
    /// Create new mock sensor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `format` in `set_pixel_format`.
    pub fn reject_format(&mut self, format: PixelFormat) {
        self.reject_format = Some(format);
    }

    /// Reject `size` in `set_frame_size`.
    pub fn reject_size(&mut self, size: FrameSize) {
        self.reject_size = Some(size);
    }

    /// Number of resets.
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Last accepted format.
    pub fn format(&self) -> Option<PixelFormat> {
        self.format
    }

    /// Last accepted size.
    pub fn size(&self) -> Option<FrameSize> {
        self.size
    }
}

impl SensorControl for MockSensor {
    type Error = MockSensorError;

    async fn reset(&mut self) -> Result<(), Self::Error> {
        self.resets += 1;
        Ok(())
    }

    async fn set_pixel_format(&mut self, format: PixelFormat) -> Result<(), Self::Error> {
        if self.reject_format == Some(format) {
            return Err(MockSensorError::UnsupportedFormat);
        }
        self.format = Some(format);
        Ok(())
    }

    async fn set_frame_size(&mut self, size: FrameSize) -> Result<(), Self::Error> {
        if self.reject_size == Some(size) {
            return Err(MockSensorError::UnsupportedSize);
        }
        self.size = Some(size);
        Ok(())
    }
}

// ── SyntheticSensor ──────────────────────────────────────────────────────────

/// Deterministic line generator standing in for a real sensor.
///
/// Raw frames carry a gradient where every byte is a function of
/// `(frame, row, column, byte-in-pixel)`, so a test can check any output
/// pixel against [`SyntheticSensor::pixel_byte`].
#[derive(Debug, Clone)]
pub struct SyntheticSensor {
    size: FrameSize,
    bytes_per_pixel: usize,
    frame: u32,
}

impl SyntheticSensor {
    /// Sensor scanning `size` at `bytes_per_pixel` on the bus.
    pub fn new(size: FrameSize, bytes_per_pixel: usize) -> Self {
        Self {
            size,
            bytes_per_pixel,
            frame: 0,
        }
    }

    /// Scan size.
    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Bytes per line on the bus.
    pub fn line_bytes(&self) -> usize {
        usize::from(self.size.width()) * self.bytes_per_pixel
    }

    /// Index of the frame `frame_lines` will produce next.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Expected byte `k` of pixel `(row, col)` in frame `frame`.
    pub fn pixel_byte(frame: u32, row: usize, col: usize, k: usize) -> u8 {
        (frame as usize * 101 + row * 31 + col * 7 + k * 3) as u8
    }

    /// Fill `buf` with line `row` of the current frame.
    pub fn fill_line(&self, row: usize, buf: &mut [u8]) {
        let bpp = self.bytes_per_pixel.max(1);
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = Self::pixel_byte(self.frame, row, i / bpp, i % bpp);
        }
    }

    /// All lines of the next frame; advances the frame counter.
    pub fn frame_lines(&mut self) -> Vec<Vec<u8>> {
        let lines = (0..usize::from(self.size.height()))
            .map(|row| {
                let mut line = std::vec![0u8; self.line_bytes()];
                self.fill_line(row, &mut line);
                line
            })
            .collect();
        self.frame = self.frame.wrapping_add(1);
        lines
    }

    /// A syntactically framed JPEG image of exactly `len` bytes (min 4):
    /// `FF D8`, a body free of `FF`, `FF D9`.
    pub fn jpeg_image(len: usize) -> Vec<u8> {
        let len = len.max(4);
        let mut image = Vec::with_capacity(len);
        image.extend_from_slice(&[0xFF, 0xD8]);
        image.extend((0..len - 4).map(|i| (i % 0xFE) as u8));
        image.extend_from_slice(&[0xFF, 0xD9]);
        image
    }

    /// Split `image` into fixed-width lines of `line_bytes`, each carrying
    /// up to `payload_per_line` bytes behind a `framing` length header and
    /// padded with zeros.
    pub fn jpeg_lines(
        image: &[u8],
        framing: JpegFraming,
        line_bytes: usize,
        payload_per_line: usize,
    ) -> Vec<Vec<u8>> {
        let header = framing.header_len();
        let step = payload_per_line.min(line_bytes - header).max(1);
        image
            .chunks(step)
            .map(|chunk| {
                let mut line = std::vec![0u8; line_bytes];
                Self::write_header(framing, chunk.len(), &mut line);
                line[header..header + chunk.len()].copy_from_slice(chunk);
                line
            })
            .collect()
    }

    /// Encode a length header at the start of `line`.
    pub fn write_header(framing: JpegFraming, len: usize, line: &mut [u8]) {
        match framing {
            JpegFraming::None => {}
            JpegFraming::LengthPrefixed16 => {
                line[..2].copy_from_slice(&(len as u16).to_be_bytes());
            }
            JpegFraming::LengthPrefixed24 => {
                line[..4].copy_from_slice(&((len as u32) & 0x00FF_FFFF).to_le_bytes());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_csi_records_state() {
        let mut csi = MockCsi::new();
        let cfg = CsiConfig {
            line_bytes: 640,
            lines_per_frame: 240,
            jpeg: false,
        };
        csi.configure(&cfg).unwrap();
        csi.enable();
        csi.set_interrupts(true);
        assert!(csi.is_enabled());
        assert!(csi.interrupts_enabled());
        assert_eq!(csi.config(), Some(cfg));

        csi.disable();
        assert!(!csi.is_enabled());
        assert_eq!(csi.disable_calls(), 1);

        csi.fail_configure(true);
        assert_eq!(csi.configure(&cfg), Err(MockCsiError));
    }

    #[test]
    fn test_mock_assist_busy_then_copies() {
        let mut assist = MockCopyAssist::new(TransferWidth::Word, 4);
        assist.busy_for(2);
        let src = [1u8, 2, 3, 4];
        let mut dst = [0u8; 4];
        let mut job = StridedCopy::contiguous(0, 0, 4);
        job.width = TransferWidth::Word;
        assert_eq!(assist.submit(&src, &mut dst, &job), Err(CopyAssistError::Busy));
        assert_eq!(assist.submit(&src, &mut dst, &job), Err(CopyAssistError::Busy));
        assist.submit(&src, &mut dst, &job).unwrap();
        assert_eq!(dst, src);
        assert_eq!(assist.submits(), 3);
        assert_eq!(assist.last_width(), Some(TransferWidth::Word));
    }

    #[test]
    fn test_mock_assist_rejects_misaligned() {
        let mut assist = MockCopyAssist::new(TransferWidth::Word, 4);
        let mut job = StridedCopy::contiguous(2, 0, 4);
        job.width = TransferWidth::Word;
        assert_eq!(
            assist.submit(&[0; 8], &mut [0; 8], &job),
            Err(CopyAssistError::Unsupported)
        );
    }

    #[tokio::test]
    async fn test_mock_sensor() {
        let mut sensor = MockSensor::new();
        sensor.reject_format(PixelFormat::Bayer);
        sensor.reset().await.unwrap();
        sensor.set_pixel_format(PixelFormat::Rgb565).await.unwrap();
        sensor.set_frame_size(FrameSize::QVGA).await.unwrap();
        assert_eq!(
            sensor.set_pixel_format(PixelFormat::Bayer).await,
            Err(MockSensorError::UnsupportedFormat)
        );
        assert_eq!(sensor.resets(), 1);
        assert_eq!(sensor.format(), Some(PixelFormat::Rgb565));
        assert_eq!(sensor.size(), Some(FrameSize::QVGA));
    }

    #[test]
    fn test_synthetic_raw_frame() {
        let mut sensor = SyntheticSensor::new(FrameSize::new(8, 4).unwrap(), 2);
        let lines = sensor.frame_lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].len(), 16);
        assert_eq!(lines[2][5], SyntheticSensor::pixel_byte(0, 2, 2, 1));
        assert_eq!(sensor.frame(), 1);
    }

    #[test]
    fn test_synthetic_jpeg_lines() {
        let image = SyntheticSensor::jpeg_image(10);
        assert_eq!(&image[..2], &[0xFF, 0xD8]);
        assert_eq!(&image[8..], &[0xFF, 0xD9]);

        let lines = SyntheticSensor::jpeg_lines(&image, JpegFraming::LengthPrefixed16, 8, 4);
        assert_eq!(lines.len(), 3);
        assert_eq!(&lines[0][..2], &[0, 4]);
        assert_eq!(&lines[2][..2], &[0, 2]);
        assert_eq!(&lines[2][2..4], &[0xFF, 0xD9]);

        let lines = SyntheticSensor::jpeg_lines(&image, JpegFraming::LengthPrefixed24, 16, 16);
        assert_eq!(lines.len(), 1);
        assert_eq!(&lines[0][..4], &[10, 0, 0, 0]);
    }
}
