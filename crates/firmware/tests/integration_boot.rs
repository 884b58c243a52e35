//! Boot sequence integration tests
//!
//! Validates that the boot-time constants line up with the DMA memory layout
//! the capture engine relies on, without needing physical hardware.
//!
//! Run with: cargo test -p firmware --test integration_boot
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects, clippy::panic)]

use firmware::boot::{axi_sram_register_pair, rasr_size_field, BOOT_SEQUENCE_STEPS};
use platform::dma_safety::{
    AXI_SRAM_BASE, AXI_SRAM_SIZE_BYTES, FRAME_POOL_BYTES, LINE_BUFFER_COUNT, MAX_LINE_BUFFER_BYTES,
};

/// The MPU region must cover the frame pool and both line buffers, since
/// all of them are placed in `.axisram`.
#[test]
fn test_axi_sram_region_covers_dma_memory() {
    let (rbar, rasr) = axi_sram_register_pair().expect("AXI SRAM region encodes");
    assert_eq!(rbar & 0xFFFF_FFE0, AXI_SRAM_BASE);

    let size_field = (rasr >> 1) & 0x1F;
    let region_bytes = 1usize << (size_field + 1);
    assert_eq!(region_bytes, AXI_SRAM_SIZE_BYTES);
    assert!(FRAME_POOL_BYTES + LINE_BUFFER_COUNT * MAX_LINE_BUFFER_BYTES <= region_bytes);
}

/// Non-cacheable normal memory: TEX=001, C=0, B=0.
#[test]
fn test_axi_sram_region_is_non_cacheable() {
    let (_, rasr) = axi_sram_register_pair().expect("AXI SRAM region encodes");
    assert_eq!((rasr >> 19) & 0b111, 0b001, "TEX");
    assert_eq!((rasr >> 17) & 1, 0, "C");
    assert_eq!((rasr >> 16) & 1, 0, "B");
    assert_eq!(rasr & 1, 1, "ENABLE");
}

#[test]
fn test_size_field_rejects_odd_sizes() {
    assert_eq!(rasr_size_field(512 * 1024), Some(18 << 1));
    assert_eq!(rasr_size_field(48 * 1024), None);
    assert_eq!(rasr_size_field(16), None);
}

/// MPU before cache, cache before the DCMI stream is started.
#[test]
fn test_boot_sequence_order() {
    let position = |needle: &str| {
        BOOT_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains(needle))
            .unwrap_or_else(|| panic!("missing boot step {needle}"))
    };
    assert!(position("MPU") < position("D-cache"));
    assert!(position("D-cache") < position("DCMI"));
    assert!(position("DCMI") < position("executor"));
}
