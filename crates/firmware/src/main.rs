//! Camera module firmware - main entry point.
//!
//! Hardware-only entry point for STM32H743ZI.

#![no_std]
#![no_main]

use capture::{CameraDriver, CaptureConfig, FramePool};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::peripherals::PE3;
use embassy_stm32::pac::interrupt;
use embassy_sync::once_lock::OnceLock;
use embassy_time::{Duration, Timer};
use platform::dma_safety::{Align32, FRAME_POOL_BUFFERS, FRAME_POOL_BYTES, MAX_LINE_BUFFER_BYTES};
use platform::NoAssist;
use static_cell::ConstStaticCell;

use firmware::camera::dcmi::{self, DcmiCsi, LineBuffers};
use firmware::camera::{default_session, register_frame_events, FrameEvents};

// Panic handler
use panic_probe as _;

type Camera = CameraDriver<DcmiCsi, FramePool<'static, FRAME_POOL_BUFFERS>, NoAssist, Output<'static, PE3>>;

// Frame pool and line buffers live in AXI SRAM (non-cacheable via the MPU).
#[link_section = ".axisram"]
static FRAME_MEMORY: ConstStaticCell<Align32<[u8; FRAME_POOL_BYTES]>> =
    ConstStaticCell::new(Align32([0; FRAME_POOL_BYTES]));

#[link_section = ".axisram"]
static LINE_MEMORY: ConstStaticCell<LineBuffers> =
    ConstStaticCell::new([Align32([0; MAX_LINE_BUFFER_BYTES]), Align32([0; MAX_LINE_BUFFER_BYTES])]);

static CAMERA: OnceLock<Camera> = OnceLock::new();
static LINES: OnceLock<&'static LineBuffers> = OnceLock::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // MPU before embassy_stm32::init(): init enables the D-cache.
    firmware::boot::hardware::apply_mpu_config_from_peripherals();

    defmt::info!("camera firmware v{=str}", env!("CARGO_PKG_VERSION"));
    let p = embassy_stm32::init(firmware::boot::build_embassy_config());

    let lines: &'static LineBuffers = LINE_MEMORY.take();
    let _ = LINES.init(lines);
    let csi = DcmiCsi::new(lines);

    let frame_memory = FRAME_MEMORY.take();
    let Some(pool) = FramePool::new(&mut frame_memory.0) else {
        defmt::error!("frame pool memory too small");
        return;
    };
    // Sensor FSIN input on PE3.
    let frame_sync = Output::new(p.PE3, Level::Low, Speed::High);

    let camera = match CameraDriver::with_frame_sync(csi, pool, NoAssist, frame_sync, CaptureConfig::default()) {
        Ok(camera) => camera,
        Err(e) => {
            defmt::error!("capture config rejected: {}", e);
            return;
        }
    };
    let _ = CAMERA.init(camera);
    let camera = CAMERA.get().await;

    if let Err(e) = camera.configure(default_session()) {
        defmt::error!("session rejected: {}", e);
        return;
    }
    register_frame_events(camera);

    // SAFETY: handlers only touch statics initialized above.
    #[allow(unsafe_code)]
    unsafe {
        cortex_m::peripheral::NVIC::unmask(embassy_stm32::pac::Interrupt::DCMI);
    }

    if spawner.spawn(frame_log_task()).is_err() {
        defmt::warn!("frame log task not spawned");
    }

    let mut counter = 0u32;
    loop {
        match camera.snapshot().await {
            Ok(image) => {
                let info = image.info();
                defmt::info!(
                    "snapshot {=u16}x{=u16} {} {=usize} bytes",
                    info.width,
                    info.height,
                    info.format,
                    info.len
                );
            }
            Err(e) => defmt::warn!("snapshot failed: {}", e),
        }
        counter = counter.wrapping_add(1);
        if counter % 10 == 0 {
            defmt::info!("stats: {}", camera.stats());
        }
        Timer::after(Duration::from_secs(1)).await;
    }
}

#[embassy_executor::task]
async fn frame_log_task() {
    let mut events = FrameEvents::new();
    loop {
        let info = events.next().await;
        defmt::trace!("frame {=u32}: {=usize} bytes", info.sequence, info.bytes);
    }
}

#[interrupt]
fn DCMI() {
    if let (Some(camera), Some(lines)) = (CAMERA.try_get(), LINES.try_get()) {
        dcmi::on_dcmi_interrupt(camera, lines);
    }
}
