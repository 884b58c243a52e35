//! Shared harness for the capture integration tests.
//!
//! The harness plays the role of the DCMI interrupt handlers: it raises a
//! start-of-frame and then delivers lines only while the engine keeps the
//! DMA request open, the way the hardware stops transferring once the
//! request is cleared.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]

use capture::{CameraDriver, CaptureConfig, FramePool};
use embassy_futures::yield_now;
use embedded_hal::digital::OutputPin;
use platform::mocks::MockCsi;
use platform::{BufferRing, CopyAssist, NoAssist};

/// Buffers per pool in every test.
pub const POOL_BUFFERS: usize = 3;

/// Pool type used by the tests.
pub type Pool<'a> = FramePool<'a, POOL_BUFFERS>;

/// Driver over the mock CSI and a `Vec`-backed pool.
pub type TestDriver<'a, A = NoAssist, P = platform::NoPin> = CameraDriver<MockCsi, Pool<'a>, A, P>;

/// Backing memory for a pool of `bytes_per_buffer`-sized buffers.
pub fn pool_memory(bytes_per_buffer: usize) -> Vec<u8> {
    vec![0u8; bytes_per_buffer * POOL_BUFFERS]
}

/// Driver with CPU copies and no frame-sync pin.
pub fn driver(memory: &mut [u8], config: CaptureConfig) -> TestDriver<'_> {
    let pool = Pool::new(memory).expect("pool memory too small");
    CameraDriver::new(MockCsi::new(), pool, NoAssist, config).expect("valid config")
}

/// Driver with an explicit copy accelerator.
pub fn driver_with_assist<A: CopyAssist>(
    memory: &mut [u8],
    assist: A,
    config: CaptureConfig,
) -> TestDriver<'_, A> {
    let pool = Pool::new(memory).expect("pool memory too small");
    CameraDriver::new(MockCsi::new(), pool, assist, config).expect("valid config")
}

/// `true` while the engine wants line transfers.
pub fn dma_open<A: CopyAssist, P: OutputPin>(driver: &TestDriver<'_, A, P>) -> bool {
    driver.lock(|e| e.csi().dma_request_enabled())
}

/// Free buffers in the pool.
pub fn free_buffers<A: CopyAssist, P: OutputPin>(driver: &TestDriver<'_, A, P>) -> usize {
    driver.lock(|e| e.ring().free_count())
}

/// Raise SOF and deliver `lines` synchronously while the DMA request is
/// open. Returns the number of lines delivered.
pub fn feed_frame<A: CopyAssist, P: OutputPin>(
    driver: &TestDriver<'_, A, P>,
    lines: &[Vec<u8>],
) -> usize {
    driver.on_start_of_frame();
    let mut delivered = 0;
    for line in lines {
        if !dma_open(driver) {
            break;
        }
        driver.on_line_ready(line);
        delivered += 1;
    }
    delivered
}

/// Wait for the snapshot to arm the capture.
pub async fn wait_armed<A: CopyAssist, P: OutputPin>(driver: &TestDriver<'_, A, P>) {
    while !driver.is_armed() {
        yield_now().await;
    }
}

/// Sensor task: wait for the arm, then stream each frame, yielding to the
/// snapshot between lines. Returns the number of lines delivered.
pub async fn stream_frames<A: CopyAssist, P: OutputPin>(
    driver: &TestDriver<'_, A, P>,
    frames: &[Vec<Vec<u8>>],
) -> usize {
    wait_armed(driver).await;
    let mut delivered = 0;
    for frame in frames {
        driver.on_start_of_frame();
        for line in frame {
            if !dma_open(driver) {
                break;
            }
            driver.on_line_ready(line);
            delivered += 1;
            yield_now().await;
        }
    }
    delivered
}
