//! Property tests for crop, transpose and luma extraction.
//!
//! Every window row is copied through `copy_line` and the result compared
//! against a direct per-pixel model of the output image.
#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]

use capture::line_copy::{copy_line, CopyPlan};
use capture::SessionParams;
use platform::mocks::{MockCopyAssist, SyntheticSensor};
use platform::{CopyAssist, FrameSize, GrayscaleSource, NoAssist, PixelFormat, TransferWidth, Window};
use proptest::prelude::*;

const SENTINEL: u8 = 0xEE;

fn format_strategy() -> impl Strategy<Value = (PixelFormat, GrayscaleSource)> {
    prop_oneof![
        Just((PixelFormat::Rgb565, GrayscaleSource::default())),
        Just((PixelFormat::Yuv422, GrayscaleSource::default())),
        Just((PixelFormat::Bayer, GrayscaleSource::default())),
        Just((PixelFormat::Grayscale, GrayscaleSource::Native)),
        Just((PixelFormat::Grayscale, GrayscaleSource::YuvLuma)),
    ]
}

/// Source size plus a window inside it.
fn scene_strategy() -> impl Strategy<Value = (u16, u16, Window)> {
    (2u16..24, 2u16..12).prop_flat_map(|(sw, sh)| {
        (0..sw, 0..sh).prop_flat_map(move |(x, y)| {
            (1..=sw - x, 1..=sh - y).prop_map(move |(w, h)| (sw, sh, Window::new(x, y, w, h)))
        })
    })
}

/// Copy every window row of one synthetic frame and check each output byte.
fn check_frame<A: CopyAssist>(
    assist: &mut A,
    format: PixelFormat,
    gray: GrayscaleSource,
    (sw, sh, window): (u16, u16, Window),
    transpose: bool,
) -> Result<(), TestCaseError> {
    let params = SessionParams::new(format, FrameSize::new(sw, sh).unwrap())
        .with_window(window)
        .with_transpose(transpose)
        .with_grayscale_source(gray);
    let g = params.geometry();
    let plan = CopyPlan::new(&g, transpose, assist.max_width(), assist.min_chunk_bytes());

    let mut sensor = SyntheticSensor::new(params.source, g.src_bpp);
    let lines = sensor.frame_lines();
    let mut frame = vec![SENTINEL; g.frame_bytes + 8];
    for row in g.crop_y..g.crop_y + g.target_height {
        copy_line(&plan, assist, 3, &lines[row], row - g.crop_y, &mut frame).unwrap();
    }

    let (w, h) = (g.target_width, g.target_height);
    for r in 0..h {
        for c in 0..w {
            let out_pixel = if transpose { c * h + r } else { r * w + c };
            for k in 0..g.dst_bpp {
                let expected = SyntheticSensor::pixel_byte(0, g.crop_y + r, g.crop_x + c, k);
                prop_assert_eq!(frame[out_pixel * g.dst_bpp + k], expected);
            }
        }
    }
    prop_assert!(frame[g.frame_bytes..].iter().all(|b| *b == SENTINEL));
    Ok(())
}

proptest! {
    /// CPU copy produces the windowed, optionally transposed image.
    #[test]
    fn cpu_copy_matches_model(
        (format, gray) in format_strategy(),
        scene in scene_strategy(),
        transpose in any::<bool>(),
    ) {
        check_frame(&mut NoAssist, format, gray, scene, transpose)?;
    }

    /// The accelerated path picks a legal beat width and matches the model.
    #[test]
    fn accelerated_copy_matches_model(
        (format, gray) in format_strategy(),
        scene in scene_strategy(),
        transpose in any::<bool>(),
        max_width in prop_oneof![
            Just(TransferWidth::HalfWord),
            Just(TransferWidth::Word),
            Just(TransferWidth::DoubleWord),
        ],
    ) {
        let mut assist = MockCopyAssist::new(max_width, 1);
        check_frame(&mut assist, format, gray, scene, transpose)?;
        prop_assert_eq!(assist.submits(), assist.completed());
        if let Some(width) = assist.last_width() {
            prop_assert!(width <= max_width);
        }
    }
}
