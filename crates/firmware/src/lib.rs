//! Camera module firmware
//!
//! Application layer over the `capture` engine for an STM32H7 with a DCMI
//! camera sensor.
//!
//! # Architecture
//!
//! ```text
//! Application Layer (main.rs, camera::FrameEvents)
//!         ↓
//! Capture core (capture::CameraDriver)
//!         ↓
//! Hardware binding (camera::dcmi, boot)
//!         ↓
//! Platform HAL (Embassy, STM32)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for STM32H7 target (embassy, DCMI binding)
//! - `emulator` - Build the host capture emulator (tokio, tracing)
//! - `std` - Enable standard library (for emulator and testing)
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```
//!
//! ## Emulator Target
//!
//! ```bash
//! RUST_LOG=debug cargo run --example capture_emulator --features emulator
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
// Register addresses are u32 on this target.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod boot;
pub mod camera;

pub use camera::{forward_frame_event, FrameEvents, FRAME_EVENTS};
