//! Copy accelerator capability (MDMA, 2D DMA, ...)
//!
//! The line copy engine describes every scanline copy as a [`StridedCopy`]:
//! `count` elements of `element_bytes`, read every `src_increment` bytes and
//! written every `dst_increment` bytes. An accelerator executes the job in
//! beats of [`TransferWidth`]; the CPU path is [`StridedCopy::copy_bytewise`].
//!
//! Accelerators are optional. [`NoAssist`] reports no capability and the
//! engine always falls back to the CPU.

/// Error returned by a copy accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CopyAssistError {
    /// A previous transfer is still in flight; retry.
    #[error("copy accelerator busy")]
    Busy,
    /// The accelerator cannot execute this job shape.
    #[error("copy job not supported by accelerator")]
    Unsupported,
    /// The job addresses bytes outside the source or destination slice.
    #[error("copy job out of bounds")]
    OutOfBounds,
}

/// Beat width of an accelerated transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferWidth {
    /// 8-bit beats.
    Byte = 1,
    /// 16-bit beats.
    HalfWord = 2,
    /// 32-bit beats.
    Word = 4,
    /// 64-bit beats.
    DoubleWord = 8,
}

impl TransferWidth {
    /// Beat size in bytes.
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Largest width not wider than `max` that evenly divides every value.
    ///
    /// Always succeeds: `Byte` divides anything.
    pub fn largest_dividing(max: Self, values: &[usize]) -> Self {
        [Self::DoubleWord, Self::Word, Self::HalfWord]
            .into_iter()
            .filter(|w| *w <= max)
            .find(|w| {
                values
                    .iter()
                    .all(|v| matches!(v.checked_rem(w.bytes()), Some(0)))
            })
            .unwrap_or(Self::Byte)
    }
}

/// One strided copy job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StridedCopy {
    /// Beat width the accelerator should use.
    pub width: TransferWidth,
    /// Bytes per element.
    pub element_bytes: usize,
    /// Number of elements.
    pub count: usize,
    /// First source byte.
    pub src_offset: usize,
    /// Distance between element starts in the source.
    pub src_increment: usize,
    /// First destination byte.
    pub dst_offset: usize,
    /// Distance between element starts in the destination.
    pub dst_increment: usize,
}

impl StridedCopy {
    /// A single contiguous run of `len` bytes.
    pub const fn contiguous(src_offset: usize, dst_offset: usize, len: usize) -> Self {
        Self {
            width: TransferWidth::Byte,
            element_bytes: len,
            count: 1,
            src_offset,
            src_increment: len,
            dst_offset,
            dst_increment: len,
        }
    }

    /// Total payload bytes moved.
    pub fn total_bytes(&self) -> Option<usize> {
        self.element_bytes.checked_mul(self.count)
    }

    /// One past the last source byte touched, `None` on overflow.
    pub fn src_end(&self) -> Option<usize> {
        Self::span_end(self.src_offset, self.src_increment, self.element_bytes, self.count)
    }

    /// One past the last destination byte touched, `None` on overflow.
    pub fn dst_end(&self) -> Option<usize> {
        Self::span_end(self.dst_offset, self.dst_increment, self.element_bytes, self.count)
    }

    fn span_end(offset: usize, increment: usize, element: usize, count: usize) -> Option<usize> {
        if count == 0 {
            return Some(offset);
        }
        let last = count.checked_sub(1)?.checked_mul(increment)?;
        offset.checked_add(last)?.checked_add(element)
    }

    /// Check the job against the slice lengths.
    pub fn check_bounds(&self, src_len: usize, dst_len: usize) -> Result<(), CopyAssistError> {
        match (self.src_end(), self.dst_end()) {
            (Some(s), Some(d)) if s <= src_len && d <= dst_len => Ok(()),
            _ => Err(CopyAssistError::OutOfBounds),
        }
    }

    /// Execute the job on the CPU.
    ///
    /// Every access is bounds-checked; nothing is written when the job does
    /// not fit.
    pub fn copy_bytewise(&self, src: &[u8], dst: &mut [u8]) -> Result<(), CopyAssistError> {
        self.check_bounds(src.len(), dst.len())?;

        let contiguous =
            self.src_increment == self.element_bytes && self.dst_increment == self.element_bytes;
        if contiguous {
            let len = self.total_bytes().ok_or(CopyAssistError::OutOfBounds)?;
            let s = Self::slice(src, self.src_offset, len)?;
            let d = Self::slice_mut(dst, self.dst_offset, len)?;
            d.copy_from_slice(s);
            return Ok(());
        }

        let mut src_pos = self.src_offset;
        let mut dst_pos = self.dst_offset;
        for _ in 0..self.count {
            let s = Self::slice(src, src_pos, self.element_bytes)?;
            let d = Self::slice_mut(dst, dst_pos, self.element_bytes)?;
            d.copy_from_slice(s);
            src_pos = src_pos.saturating_add(self.src_increment);
            dst_pos = dst_pos.saturating_add(self.dst_increment);
        }
        Ok(())
    }

    fn slice(buf: &[u8], start: usize, len: usize) -> Result<&[u8], CopyAssistError> {
        let end = start.checked_add(len).ok_or(CopyAssistError::OutOfBounds)?;
        buf.get(start..end).ok_or(CopyAssistError::OutOfBounds)
    }

    fn slice_mut(buf: &mut [u8], start: usize, len: usize) -> Result<&mut [u8], CopyAssistError> {
        let end = start.checked_add(len).ok_or(CopyAssistError::OutOfBounds)?;
        buf.get_mut(start..end).ok_or(CopyAssistError::OutOfBounds)
    }
}

/// Copy accelerator capability.
///
/// `submit` runs to completion before returning (the line interrupt is the
/// only caller and the next line cannot arrive before the copy is done), or
/// fails immediately with [`CopyAssistError::Busy`].
pub trait CopyAssist {
    /// Widest beat the accelerator supports.
    fn max_width(&self) -> TransferWidth;

    /// Elements smaller than this are cheaper to copy on the CPU.
    fn min_chunk_bytes(&self) -> usize;

    /// Execute `job` from `src` into `dst`.
    fn submit(&mut self, src: &[u8], dst: &mut [u8], job: &StridedCopy)
        -> Result<(), CopyAssistError>;
}

/// No accelerator: every copy takes the CPU path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAssist;

impl CopyAssist for NoAssist {
    fn max_width(&self) -> TransferWidth {
        TransferWidth::Byte
    }

    fn min_chunk_bytes(&self) -> usize {
        usize::MAX
    }

    fn submit(&mut self, _src: &[u8], _dst: &mut [u8], _job: &StridedCopy)
        -> Result<(), CopyAssistError> {
        Err(CopyAssistError::Unsupported)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_dividing_width() {
        use TransferWidth::*;
        assert_eq!(TransferWidth::largest_dividing(DoubleWord, &[16, 640, 64]), DoubleWord);
        assert_eq!(TransferWidth::largest_dividing(Word, &[16, 640, 64]), Word);
        assert_eq!(TransferWidth::largest_dividing(DoubleWord, &[100, 640, 2]), HalfWord);
        assert_eq!(TransferWidth::largest_dividing(DoubleWord, &[3, 640]), Byte);
        assert_eq!(TransferWidth::largest_dividing(Byte, &[8]), Byte);
    }

    #[test]
    fn test_contiguous_copy() {
        let src = [1u8, 2, 3, 4, 5, 6];
        let mut dst = [0u8; 6];
        StridedCopy::contiguous(2, 1, 3).copy_bytewise(&src, &mut dst).unwrap();
        assert_eq!(dst, [0, 3, 4, 5, 0, 0]);
    }

    #[test]
    fn test_strided_copy_scatters() {
        // Two-byte elements scattered every 6 bytes (a transposed column).
        let src = [10u8, 11, 20, 21, 30, 31];
        let mut dst = [0u8; 14];
        let job = StridedCopy {
            width: TransferWidth::Byte,
            element_bytes: 2,
            count: 3,
            src_offset: 0,
            src_increment: 2,
            dst_offset: 2,
            dst_increment: 4,
        };
        job.copy_bytewise(&src, &mut dst).unwrap();
        assert_eq!(&dst[2..4], &[10, 11]);
        assert_eq!(&dst[6..8], &[20, 21]);
        assert_eq!(&dst[10..12], &[30, 31]);
        assert_eq!(dst[0], 0);
        assert_eq!(dst[12], 0);
    }

    #[test]
    fn test_out_of_bounds_writes_nothing() {
        let src = [1u8; 4];
        let mut dst = [0u8; 4];
        let job = StridedCopy::contiguous(0, 2, 4);
        assert_eq!(job.copy_bytewise(&src, &mut dst), Err(CopyAssistError::OutOfBounds));
        assert_eq!(dst, [0; 4]);
    }

    #[test]
    fn test_no_assist_is_unsupported() {
        let mut assist = NoAssist;
        let job = StridedCopy::contiguous(0, 0, 1);
        assert_eq!(assist.submit(&[0], &mut [0], &job), Err(CopyAssistError::Unsupported));
        assert_eq!(assist.max_width(), TransferWidth::Byte);
    }
}
