//! JPEG reassembly from length-prefixed fixed-width lines.
//!
//! Each DMA line carries a header with the number of valid payload bytes
//! followed by padding. Payloads are appended at the buffer's `offset` and
//! the stream ends at the first `FF D9`. The marker may straddle two lines,
//! so each scan starts one byte before the new payload.

use platform::{JpegFraming, VBuffer};

/// Start-of-image marker.
pub const SOI_MARKER: [u8; 2] = [0xFF, 0xD8];

/// End-of-image marker.
pub const EOI_MARKER: [u8; 2] = [0xFF, 0xD9];

/// A line whose header cannot be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChunkError {
    /// Line shorter than the header, or framing is `None`.
    MissingHeader,
    /// Declared length runs past the end of the line.
    LengthExceedsLine,
}

/// Result of appending one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppendOutcome {
    /// Marker not seen yet.
    Continue,
    /// The payload completed the image.
    EndOfImage,
    /// The payload did not fit; `jpeg_overflow` is set.
    Overflow,
}

/// Extract the valid payload from one framed line.
pub fn split_chunk(framing: JpegFraming, line: &[u8]) -> Result<&[u8], ChunkError> {
    let header = framing.header_len();
    let len = match framing {
        JpegFraming::None => return Err(ChunkError::MissingHeader),
        JpegFraming::LengthPrefixed16 => match line {
            [hi, lo, ..] => usize::from(u16::from_be_bytes([*hi, *lo])),
            _ => return Err(ChunkError::MissingHeader),
        },
        JpegFraming::LengthPrefixed24 => match line {
            [b0, b1, b2, _, ..] => {
                usize::try_from(u32::from_le_bytes([*b0, *b1, *b2, 0])).unwrap_or(usize::MAX)
            }
            _ => return Err(ChunkError::MissingHeader),
        },
    };
    let end = header.checked_add(len).ok_or(ChunkError::LengthExceedsLine)?;
    line.get(header..end).ok_or(ChunkError::LengthExceedsLine)
}

/// Index one past the first end marker in `data[from..]`.
pub fn find_eoi(data: &[u8], from: usize) -> Option<usize> {
    let tail = data.get(from..)?;
    tail.windows(2)
        .position(|w| w == EOI_MARKER)
        .and_then(|pos| from.checked_add(pos)?.checked_add(2))
}

/// Length of the stream up to and including the first end marker, or the
/// whole input when there is none.
pub fn trim_to_eoi(data: &[u8]) -> usize {
    find_eoi(data, 0).unwrap_or(data.len())
}

/// Append `payload` at `vb.offset`.
///
/// On overflow nothing is written and `jpeg_overflow` is set; the caller
/// hands the buffer off so the snapshot can report it.
pub fn append<S: AsRef<[u8]> + AsMut<[u8]>>(vb: &mut VBuffer<S>, payload: &[u8]) -> AppendOutcome {
    let start = vb.offset;
    let Some(end) = start.checked_add(payload.len()).filter(|e| *e <= vb.capacity()) else {
        vb.jpeg_overflow = true;
        return AppendOutcome::Overflow;
    };
    let Some(dst) = vb.data_mut().get_mut(start..end) else {
        vb.jpeg_overflow = true;
        return AppendOutcome::Overflow;
    };
    dst.copy_from_slice(payload);
    vb.offset = end;

    let scan_from = start.saturating_sub(1);
    let written = vb.data().get(..end).unwrap_or_default();
    if find_eoi(written, scan_from).is_some() {
        AppendOutcome::EndOfImage
    } else {
        AppendOutcome::Continue
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_be16() {
        let line = [0x00, 0x03, 1, 2, 3, 0, 0, 0];
        assert_eq!(split_chunk(JpegFraming::LengthPrefixed16, &line), Ok(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_split_le24_ignores_top_byte() {
        let line = [0x02, 0x00, 0x00, 0xAB, 9, 8, 7];
        assert_eq!(split_chunk(JpegFraming::LengthPrefixed24, &line), Ok(&[9u8, 8][..]));
    }

    #[test]
    fn test_split_rejects_bad_headers() {
        assert_eq!(
            split_chunk(JpegFraming::LengthPrefixed16, &[0x00]),
            Err(ChunkError::MissingHeader)
        );
        assert_eq!(
            split_chunk(JpegFraming::LengthPrefixed16, &[0x00, 0x09, 1, 2]),
            Err(ChunkError::LengthExceedsLine)
        );
        assert_eq!(split_chunk(JpegFraming::None, &[0; 8]), Err(ChunkError::MissingHeader));
    }

    #[test]
    fn test_find_eoi() {
        let data = [0xFF, 0xD8, 1, 0xFF, 0xD9, 0, 0];
        assert_eq!(find_eoi(&data, 0), Some(5));
        assert_eq!(find_eoi(&data, 4), None);
        assert_eq!(find_eoi(&data, 99), None);
        assert_eq!(trim_to_eoi(&data), 5);
        assert_eq!(trim_to_eoi(&data[..3]), 3);
    }

    #[test]
    fn test_marker_split_across_payloads() {
        let mut vb = VBuffer::new([0u8; 16]);
        assert_eq!(append(&mut vb, &[0xFF, 0xD8, 5, 0xFF]), AppendOutcome::Continue);
        assert_eq!(append(&mut vb, &[0xD9]), AppendOutcome::EndOfImage);
        assert_eq!(vb.offset, 5);
    }

    #[test]
    fn test_overflow_writes_nothing() {
        let mut vb = VBuffer::new([0u8; 4]);
        assert_eq!(append(&mut vb, &[1, 2, 3]), AppendOutcome::Continue);
        assert_eq!(append(&mut vb, &[4, 5]), AppendOutcome::Overflow);
        assert!(vb.jpeg_overflow);
        assert_eq!(vb.offset, 3);
        assert_eq!(vb.data(), &[1, 2, 3, 0]);
    }
}
