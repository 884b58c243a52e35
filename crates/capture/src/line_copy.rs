//! Line copy engine: one DMA line into one row (or column) of the frame.
//!
//! Every case reduces to a single [`StridedCopy`] per line:
//!
//! | Case | element | count | src step | dst step | row origin |
//! |------|---------|-------|----------|----------|------------|
//! | plain | `w * bpp` | 1 | - | - | `r * w * bpp` |
//! | narrowing (YUV → Y) | 1 | `w` | `src_bpp` | 1 | `r * w` |
//! | transposed | `bpp` | `w` | `bpp` | `h * bpp` | `r * bpp` |
//! | transposed + narrowing | 1 | `w` | `src_bpp` | `h` | `r` |
//!
//! `w`/`h` are the crop window size and `r` the row inside the window. The
//! source always starts at `crop_x * src_bpp`, so columns outside the window
//! are never read.

use platform::{CopyAssist, CopyAssistError, StridedCopy, TransferWidth};

use crate::session::Geometry;

/// Per-session copy tuning, computed once when the capture is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CopyPlan {
    /// First source byte of the window.
    pub src_offset: usize,
    /// Bytes moved per element (`source_chunk_size`).
    pub element_bytes: usize,
    /// Elements per line.
    pub count: usize,
    /// Source distance between elements.
    pub src_increment: usize,
    /// Destination distance between elements.
    pub dst_increment: usize,
    /// Destination distance between consecutive window rows.
    pub row_increment: usize,
    /// Beat width for the accelerator.
    pub width: TransferWidth,
    /// Use the accelerator (otherwise CPU copy).
    pub accelerated: bool,
}

impl CopyPlan {
    /// Plan the copy for `geometry` given the accelerator's capability.
    pub fn new(geometry: &Geometry, transpose: bool, max_width: TransferWidth, min_chunk: usize) -> Self {
        let w = geometry.target_width;
        let h = geometry.target_height;
        let src_bpp = geometry.src_bpp;
        let dst_bpp = geometry.dst_bpp;
        let narrowing = geometry.narrowing();

        let element_bytes = if narrowing {
            1
        } else if transpose {
            dst_bpp
        } else {
            w.saturating_mul(dst_bpp)
        };
        let count = if narrowing || transpose { w } else { 1 };
        let src_increment = if narrowing { src_bpp } else { element_bytes };
        let dst_increment = if transpose {
            h.saturating_mul(dst_bpp)
        } else if narrowing {
            dst_bpp
        } else {
            element_bytes
        };
        let row_increment = if transpose {
            dst_bpp
        } else {
            w.saturating_mul(dst_bpp)
        };
        let src_offset = geometry.crop_x.saturating_mul(src_bpp);

        let width = TransferWidth::largest_dividing(
            max_width,
            &[src_offset, element_bytes, src_increment, dst_increment, row_increment],
        );
        let accelerated = max_width > TransferWidth::Byte && element_bytes >= min_chunk;

        Self {
            src_offset,
            element_bytes,
            count,
            src_increment,
            dst_increment,
            row_increment,
            width,
            accelerated,
        }
    }

    /// The job for window row `row`.
    pub fn job(&self, row: usize) -> StridedCopy {
        StridedCopy {
            width: self.width,
            element_bytes: self.element_bytes,
            count: self.count,
            src_offset: self.src_offset,
            src_increment: self.src_increment,
            dst_offset: row.saturating_mul(self.row_increment),
            dst_increment: self.dst_increment,
        }
    }
}

/// Why a line could not be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineCopyError {
    /// Accelerator still busy after every retry.
    Backpressure,
    /// Line too short or frame buffer too small for the job.
    OutOfBounds,
}

/// Copy window row `row` from `line` into `frame`.
///
/// Returns the number of `Busy` retries spent.
pub fn copy_line<A: CopyAssist>(
    plan: &CopyPlan,
    assist: &mut A,
    retries: u8,
    line: &[u8],
    row: usize,
    frame: &mut [u8],
) -> Result<u8, LineCopyError> {
    let job = plan.job(row);
    job.check_bounds(line.len(), frame.len())
        .map_err(|_| LineCopyError::OutOfBounds)?;

    if plan.accelerated {
        let mut spent = 0u8;
        loop {
            match assist.submit(line, frame, &job) {
                Ok(()) => return Ok(spent),
                Err(CopyAssistError::Busy) if spent < retries => {
                    spent = spent.saturating_add(1);
                }
                Err(CopyAssistError::Busy) => return Err(LineCopyError::Backpressure),
                Err(CopyAssistError::Unsupported) => break,
                Err(CopyAssistError::OutOfBounds) => return Err(LineCopyError::OutOfBounds),
            }
        }
    }

    job.copy_bytewise(line, frame)
        .map(|()| 0)
        .map_err(|_| LineCopyError::OutOfBounds)
}
