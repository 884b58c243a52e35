//! CSI frame-capture core
//!
//! Pulls scanlines from a camera serial interface into frame buffers under
//! interrupt control and hands completed frames to the application.
//!
//! # Architecture
//!
//! ```text
//! snapshot() ──arm──▶ CaptureEngine ◀── on_start_of_frame() / on_line_ready()
//!     ▲                  │    │                    (DCMI interrupts)
//!     │            line_copy  jpeg
//!     │                  ▼    ▼
//!     └──acquire_read── BufferRing (FramePool) ◀──acquire_write / complete_write
//! ```
//!
//! - [`session`]: what to capture and the derived line/frame geometry
//! - [`line_copy`]: crop, transpose and luma extraction for one line
//! - [`jpeg`]: length-prefixed line reassembly and end-marker detection
//! - [`engine`]: the capture state machine
//! - [`driver`]: interrupt-safe wrapper shared with the ISR
//! - [`snapshot`]: the application-facing wait-with-timeout
//! - [`pool`]: a fixed-size [`BufferRing`](platform::BufferRing)
//!
//! # Features
//!
//! - `defmt`: log through defmt (hardware)
//! - `tracing`: log through tracing (host / emulator)
//! - `std`: expose `platform::mocks` to dependents

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
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// fmt must come first so its macros are visible to the other modules.
mod fmt;

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod jpeg;
pub mod line_copy;
pub mod pool;
pub mod session;
pub mod snapshot;

pub use config::{CaptureConfig, ConfigError};
pub use driver::CameraDriver;
pub use engine::{CaptureEngine, CaptureState, CaptureStats, FrameCallback, FrameInfo};
pub use error::CaptureError;
pub use pool::FramePool;
pub use session::{Geometry, SessionParams};
pub use snapshot::{Image, ImageInfo, COPY_CHUNK_BYTES};
