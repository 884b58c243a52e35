//! Architecture boundary tests — run with `cargo test -p firmware --test arch_boundaries`
#![allow(clippy::unwrap_used, clippy::expect_used)]
//!
//! Layering rules:
//!   Rule 1: platform (HAL) must not depend on capture or firmware
//!   Rule 2: capture must not depend on firmware or a concrete HAL
//!   Rule 3: emulator-only crates stay optional in the firmware manifest
//!
//! Cargo rejects a dependency cycle, so these tests only need to compile:
//! if `platform` or `capture` reached back into `firmware`, this binary
//! could not be built.

use capture::{CameraDriver, CaptureConfig, FramePool, SessionParams};
use platform::mocks::MockCsi;
use platform::{BufferRing, CopyAssist, CsiPeripheral, FrameSize, NoAssist, PixelFormat, SensorControl};

/// The capture-facing traits are reachable from platform alone.
#[test]
fn platform_hal_is_independent() {
    fn _assert_csi<T: CsiPeripheral>() {}
    fn _assert_ring<T: BufferRing>() {}
    fn _assert_assist<T: CopyAssist>() {}
    fn _assert_sensor<T: SensorControl>() {}
    _assert_csi::<MockCsi>();
    _assert_assist::<NoAssist>();
    _assert_ring::<FramePool<'static, 2>>();
    _assert_sensor::<platform::mocks::MockSensor>();
}

/// The capture core runs on any `CsiPeripheral`, here the host mock.
#[test]
fn capture_core_is_hal_agnostic() {
    let mut memory = vec![0u8; 4096];
    let pool: FramePool<'_, 2> = FramePool::new(&mut memory).expect("pool");
    let driver = CameraDriver::new(MockCsi::new(), pool, NoAssist, CaptureConfig::default())
        .expect("config");
    driver
        .configure(SessionParams::new(PixelFormat::Rgb565, FrameSize::new(16, 8).unwrap()))
        .expect("session");
    assert!(!driver.is_armed());
}

/// Async helpers are an emulator concern: the hardware build must not pull
/// `embassy-futures` in.
#[test]
fn async_helpers_are_emulator_only() {
    let manifest = include_str!("../Cargo.toml");
    let dependency = manifest
        .lines()
        .find(|line| line.starts_with("embassy-futures"))
        .expect("embassy-futures dependency");
    assert!(dependency.contains("optional = true"), "{dependency}");

    let emulator = manifest
        .split("\nemulator = [")
        .nth(1)
        .and_then(|rest| rest.split(']').next())
        .expect("emulator feature");
    assert!(emulator.contains("\"dep:embassy-futures\""));

    let hardware = manifest
        .split("\nhardware = [")
        .nth(1)
        .and_then(|rest| rest.split(']').next())
        .expect("hardware feature");
    assert!(!hardware.contains("embassy-futures"));
}
