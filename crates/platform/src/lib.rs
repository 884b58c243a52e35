//! Hardware Abstraction Layer (HAL) for the CSI camera module
//!
//! This crate provides trait-based abstractions for every piece of hardware
//! the capture engine touches, enabling development and testing without a
//! physical sensor.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Capture core (capture crate — state machine, line copy, JPEG, snapshot)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Abstraction Levels
//!
//! ## Capture-facing
//! - [`CsiPeripheral`] - Camera serial interface enable/interrupt/DMA-request control
//! - [`BufferRing`] - Frame buffer pool contract (producer / consumer roles)
//! - [`CopyAssist`] - Optional copy accelerator (MDMA, 2D DMA) capability
//!
//! ## Initialization-only
//! - [`SensorControl`] - Sensor register protocol (format / resolution)
//! - [`gpio`] - Frame-sync output pin helpers
//!
//! ## Value types
//! - [`pixel`] - Pixel formats, frame sizes, crop windows
//! - [`dma_safety`] - DMA memory regions, alignment and line-buffer sizing
//!
//! # Features
//!
//! - `std`: Host builds; exposes [`mocks`]
//! - `hardware`: Physical hardware implementations
//! - `defmt`: Enable defmt `Format` derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{BufferRing, ReadFlags};
//!
//! fn newest_frame_len<R: BufferRing>(ring: &mut R) -> Option<usize> {
//!     let handle = ring.acquire_read(ReadFlags::NONE)?;
//!     let len = ring.buffer(handle).map(|b| b.offset);
//!     ring.release(handle);
//!     len
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod copy_assist;
pub mod csi;
pub mod dma_safety;
pub mod framebuffer;
pub mod gpio;
pub mod pixel;
pub mod sensor;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main capture-facing traits
pub use copy_assist::{CopyAssist, CopyAssistError, NoAssist, StridedCopy, TransferWidth};
pub use csi::{CsiConfig, CsiPeripheral};
pub use framebuffer::{BufferHandle, BufferRing, ReadFlags, VBuffer};
pub use sensor::SensorControl;

// Re-export value types
pub use pixel::{FrameSize, GrayscaleSource, JpegFraming, OutOfRangeError, PixelFormat, Window};

// Re-export GPIO helpers
pub use gpio::NoPin;
