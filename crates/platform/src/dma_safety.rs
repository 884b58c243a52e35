//! DMA memory placement, alignment and buffer sizing for STM32H743ZI.
//!
//! ## DMA Accessibility on STM32H743ZI
//!
//! | Memory Region | Base Address | Size   | DMA1/2 | MDMA | BDMA | Use case |
//! |---------------|-------------|--------|--------|------|------|----------|
//! | AXI SRAM      | 0x2400_0000 | 512 KB | YES    | YES  | NO   | DCMI line buffers, frame pool |
//! | SRAM1/2 (D2)  | 0x3000_0000 | 256 KB | YES    | YES  | NO   | Embassy task stacks |
//! | DTCM          | 0x2000_0000 | 128 KB | NO     | NO   | NO   | CPU-only: stack, ISR scratch |
//!
//! The DCMI line DMA (DMA1/2) and the MDMA copy assist both need the source
//! line buffer and the destination frame pool in AXI SRAM.
//!
//! ## Usage
//! ```ignore
//! use platform::dma_safety::{Align32, MAX_LINE_BUFFER_BYTES};
//!
//! #[link_section = ".axisram"]
//! static mut LINE_BUFFERS: Align32<[[u8; MAX_LINE_BUFFER_BYTES]; 2]> =
//!     Align32([[0u8; MAX_LINE_BUFFER_BYTES]; 2]);
//! ```

// ── Memory region addresses ──────────────────────────────────────────────────

/// Base address of AXI SRAM (DMA1/2/MDMA accessible, D1 domain).
pub const AXI_SRAM_BASE: u32 = 0x2400_0000;

/// Size of AXI SRAM in bytes (512 KB).
pub const AXI_SRAM_SIZE_BYTES: usize = 512 * 1024;

/// True: DTCM is NOT DMA-accessible. Place no DMA buffers here.
pub const DTCM_NOT_DMA_ACCESSIBLE: bool = true;

// ── Cache / alignment ────────────────────────────────────────────────────────

/// Cortex-M7 D-cache line size.
pub const CACHE_LINE_BYTES: usize = 32;

/// Every DCMI line transfer must be a multiple of this (32-bit DMA beats).
pub const DMA_TRANSFER_ALIGN_BYTES: usize = 4;

// ── Line buffer / frame pool sizing ──────────────────────────────────────────

/// Size of one DMA line buffer.
///
/// Fits a 4096-pixel line at 2 bytes per pixel. Raw captures wider than
/// this are rejected at snapshot time; JPEG lines are framed to fit.
pub const MAX_LINE_BUFFER_BYTES: usize = 8192;

/// Number of DMA line buffers (ping-pong).
pub const LINE_BUFFER_COUNT: usize = 2;

/// DCMI data FIFO depth in 32-bit words.
pub const DCMI_FIFO_WORDS: usize = 8;

/// Number of frame buffers in the default pool.
pub const FRAME_POOL_BUFFERS: usize = 3;

/// Bytes per frame buffer in the default pool (QVGA RGB565).
pub const FRAME_BUFFER_BYTES: usize = 320 * 240 * 2;

/// Total frame pool size in bytes.
pub const FRAME_POOL_BYTES: usize = FRAME_BUFFER_BYTES * FRAME_POOL_BUFFERS;

// ── Alignment wrapper ────────────────────────────────────────────────────────

/// A `#[repr(align(32))]` wrapper that enforces cache-line alignment for
/// Cortex-M7 DMA buffers.
///
/// A DMA buffer that shares a cache line with CPU data can be corrupted by a
/// write-back of that line. Every static touched by the DCMI DMA or the copy
/// assist uses this wrapper and lives in `.axisram`.
#[derive(Clone, Copy)]
#[repr(align(32))]
pub struct Align32<T>(
    /// The inner value. Public so callers can construct and destructure the wrapper.
    pub T,
);

// ── Marker traits ────────────────────────────────────────────────────────────

/// Marker trait: memory region accessible by DMA1, DMA2, and MDMA.
///
/// # Safety
/// Only implement for zero-sized types representing memory regions
/// that are physically accessible by the STM32H743 DMA controllers.
/// Implementing this trait for DTCM causes silent DMA data corruption.
pub unsafe trait DmaAccessible: Sized {}

/// Zero-sized type representing AXI SRAM (DMA1/DMA2/MDMA accessible).
///
/// Buffers placed here via `#[link_section = ".axisram"]`:
/// - DCMI line buffers
/// - Frame pool storage
#[derive(Debug, Clone, Copy)]
pub struct AxiSramRegion;

// SAFETY: AXI SRAM at 0x2400_0000 is in D1 domain, accessible by all
// DMA controllers (DMA1, DMA2, MDMA) per STM32H743 reference manual Table 3.
unsafe impl DmaAccessible for AxiSramRegion {}

/// Zero-sized type representing DTCM (CPU-only, NOT DMA-accessible).
#[derive(Debug, Clone, Copy)]
pub struct DtcmRegion;
// DtcmRegion does NOT implement DmaAccessible.

/// `true` when a line transfer of `line_bytes` is legal for the DCMI DMA:
/// non-zero, a multiple of `align` and no larger than `max`.
pub const fn line_transfer_is_legal(line_bytes: usize, align: usize, max: usize) -> bool {
    line_bytes != 0 && matches!(line_bytes.checked_rem(align), Some(0)) && line_bytes <= max
}

/// `true` when a stream with `remaining` words left in the current line is
/// still draining the DCMI FIFO tail of that line.
///
/// Zero means the stream just reloaded; more than a FIFO means the next line
/// has already been selected, since horizontal blanking separates the two.
pub const fn line_tail_in_flight(remaining: usize) -> bool {
    remaining != 0 && remaining <= DCMI_FIFO_WORDS
}
