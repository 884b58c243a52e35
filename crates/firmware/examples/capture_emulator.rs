//! Host capture emulator.
//!
//! Runs the capture engine against the mock CSI and a synthetic sensor that
//! streams lines the way the DCMI interrupt would, then takes one snapshot
//! per session and logs what came out.
//!
//! Run with: RUST_LOG=debug cargo run -p firmware --example capture_emulator --features emulator

use capture::{CameraDriver, CaptureConfig, CaptureError, FramePool, SessionParams};
use embassy_futures::join::join;
use embassy_futures::yield_now;
use firmware::camera::{dropped_events, register_frame_events, FrameEvents};
use platform::dma_safety::{FRAME_POOL_BUFFERS, FRAME_POOL_BYTES};
use platform::mocks::{MockCopyAssist, MockCsi, SyntheticSensor};
use platform::{FrameSize, JpegFraming, PixelFormat, TransferWidth, Window};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type Camera<'a> = CameraDriver<MockCsi, FramePool<'a, FRAME_POOL_BUFFERS>, MockCopyAssist>;

/// What the synthetic sensor puts on the bus for one session.
enum Stream {
    Raw { size: FrameSize, bytes_per_pixel: usize },
    Jpeg { image_len: usize, framing: JpegFraming, line_bytes: usize },
}

impl Stream {
    fn frames(&self, count: usize) -> Vec<Vec<Vec<u8>>> {
        match *self {
            Self::Raw { size, bytes_per_pixel } => {
                let mut sensor = SyntheticSensor::new(size, bytes_per_pixel);
                (0..count).map(|_| sensor.frame_lines()).collect()
            }
            Self::Jpeg { image_len, framing, line_bytes } => {
                let image = SyntheticSensor::jpeg_image(image_len);
                let lines = SyntheticSensor::jpeg_lines(&image, framing, line_bytes, line_bytes / 2);
                (0..count).map(|_| lines.clone()).collect()
            }
        }
    }
}

/// Interrupt stand-in: SOF, then lines while the DMA request is open.
async fn sensor_task(camera: &Camera<'_>, frames: &[Vec<Vec<u8>>]) {
    while !camera.is_armed() {
        yield_now().await;
    }
    for frame in frames {
        camera.on_start_of_frame();
        for line in frame {
            if !camera.lock(|e| e.csi().dma_request_enabled()) {
                break;
            }
            camera.on_line_ready(line);
            yield_now().await;
        }
    }
}

async fn run_session(
    camera: &Camera<'_>,
    name: &str,
    params: SessionParams,
    stream: &Stream,
) -> Result<(), CaptureError> {
    camera.configure(params)?;
    let frames = stream.frames(2);
    let (result, ()) = join(camera.snapshot(), sensor_task(camera, &frames)).await;
    let image = result?;
    let info = image.info();
    let checksum = image.with_data(|data| data.iter().fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b))));
    info!(
        session = name,
        width = info.width,
        height = info.height,
        format = info.format.name(),
        bytes = info.len,
        checksum,
        "snapshot"
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let memory = vec![0u8; FRAME_POOL_BYTES].leak();
    let Some(pool) = FramePool::new(memory) else {
        warn!("frame pool memory too small");
        return;
    };
    let config = CaptureConfig {
        timeout_ms: 500,
        ..CaptureConfig::default()
    };
    let camera = match CameraDriver::new(
        MockCsi::new(),
        pool,
        MockCopyAssist::new(TransferWidth::Word, 16),
        config,
    ) {
        Ok(camera) => camera,
        Err(e) => {
            warn!(error = %e, "capture config rejected");
            return;
        }
    };
    register_frame_events(&camera);
    let mut events = FrameEvents::new();

    let sessions = [
        (
            "qvga-rgb565",
            SessionParams::new(PixelFormat::Rgb565, FrameSize::QVGA),
            Stream::Raw { size: FrameSize::QVGA, bytes_per_pixel: 2 },
        ),
        (
            "vga-crop-transpose",
            SessionParams::new(PixelFormat::Rgb565, FrameSize::VGA)
                .with_window(Window::new(50, 40, 300, 200))
                .with_transpose(true),
            Stream::Raw { size: FrameSize::VGA, bytes_per_pixel: 2 },
        ),
        (
            "qvga-luma",
            SessionParams::new(PixelFormat::Grayscale, FrameSize::QVGA),
            Stream::Raw { size: FrameSize::QVGA, bytes_per_pixel: 2 },
        ),
        (
            "vga-jpeg",
            SessionParams::new(PixelFormat::Jpeg, FrameSize::VGA)
                .with_jpeg_framing(JpegFraming::LengthPrefixed16),
            Stream::Jpeg { image_len: 24_000, framing: JpegFraming::LengthPrefixed16, line_bytes: 640 },
        ),
    ];

    for (name, params, stream) in &sessions {
        if let Err(e) = run_session(&camera, name, *params, stream).await {
            warn!(session = *name, error = %e, "snapshot failed");
        }
        while let Some(event) = events.try_next() {
            info!(sequence = event.sequence, bytes = event.bytes, "frame event");
        }
    }

    camera.abort();
    let stats = camera.stats();
    info!(
        completed = stats.frames_completed,
        dropped = stats.frames_dropped,
        lines_dropped = stats.lines_dropped,
        copy_retries = stats.copy_retries,
        events_dropped = dropped_events(),
        "done"
    );
}
