//! Hardware boot sequence for the camera module.
//!
//! Initialization order:
//!   1. Configure MPU (AXI SRAM non-cacheable: frame pool + DCMI line buffers)
//!   2. Enable caches (`embassy_stm32::init` does this on STM32H7)
//!   3. Enable the DCMI kernel clock and route its pins
//!   4. Start the Embassy executor and arm the capture
//!
//! # Safety
//! Step 1 must run from privileged mode before any DMA stream is enabled.

use platform::dma_safety::{AXI_SRAM_BASE, AXI_SRAM_SIZE_BYTES};

/// Ordered list of boot steps, asserted by the boot tests.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. MPU: mark AXI SRAM non-cacheable before any DMA use",
    "2. D-cache: enable after MPU is configured",
    "3. DCMI: kernel clock, AF13 pins, DMA2 stream 1 on DMAMUX request 75",
    "4. Embassy executor: spawn snapshot task",
];

/// MPU region slot used for AXI SRAM.
pub const AXI_SRAM_MPU_REGION: u32 = 0;

// ── MPU register encoding ────────────────────────────────────────────────────
//
// RBAR: base[31:5] | VALID[4] | REGION[3:0]
// RASR: XN[28] | AP[26:24] | TEX[21:19] | S[18] | C[17] | B[16] | SIZE[5:1] | ENABLE[0]

const RBAR_VALID: u32 = 0x0000_0010;
const RASR_XN: u32 = 0x1000_0000;
const RASR_AP_FULL_ACCESS: u32 = 0x0300_0000;
const RASR_TEX_NORMAL_NON_CACHEABLE: u32 = 0x0008_0000;
const RASR_ENABLE: u32 = 0x0000_0001;

/// RASR SIZE field for a power-of-two region of `bytes` (`2^(SIZE+1)`),
/// already shifted into bits 5:1. `None` if `bytes` is not a power of two
/// of at least 32.
pub const fn rasr_size_field(bytes: u32) -> Option<u32> {
    if bytes < 32 || !bytes.is_power_of_two() {
        return None;
    }
    let size = bytes.trailing_zeros().wrapping_sub(1);
    size.checked_mul(2)
}

/// `(RBAR, RASR)` for AXI SRAM as normal, non-cacheable, execute-never
/// memory.
///
/// | Region   | Base        | Size   | RBAR        | RASR        |
/// |----------|-------------|--------|-------------|-------------|
/// | AXI SRAM | 0x2400_0000 | 512 KB | 0x2400_0010 | 0x1308_0025 |
pub fn axi_sram_register_pair() -> Option<(u32, u32)> {
    let bytes = u32::try_from(AXI_SRAM_SIZE_BYTES).ok()?;
    let rbar = AXI_SRAM_BASE | RBAR_VALID | AXI_SRAM_MPU_REGION;
    let rasr = RASR_XN
        | RASR_AP_FULL_ACCESS
        | RASR_TEX_NORMAL_NON_CACHEABLE
        | rasr_size_field(bytes)?
        | RASR_ENABLE;
    Some((rbar, rasr))
}

// ── RCC clock configuration ───────────────────────────────────────────────────

/// `embassy_stm32::Config` for the camera module.
///
/// HSI (64 MHz) → PLL1 (prediv=4, mul=50) → PLL1_P = 400 MHz (sys)
/// AHB: DIV2 → 200 MHz (DCMI and DMA2 run from AHB)
/// APB1/2/3/4: DIV2 → 100 MHz
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();
    config.rcc.hsi = Some(HSIPrescaler::DIV1);
    config.rcc.csi = true;
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2), // 400 MHz: system clock
        divq: None,
        divr: None,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV2;
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config.rcc.apb3_pre = APBPrescaler::DIV2;
    config.rcc.apb4_pre = APBPrescaler::DIV2;
    config.rcc.voltage_scale = VoltageScale::Scale1;
    config
}

// ── Hardware-only init ────────────────────────────────────────────────────────

#[cfg(feature = "hardware")]
pub mod hardware {
    //! Register writes; only compiled with `--features hardware`.

    /// Program the AXI SRAM region into the Cortex-M7 MPU.
    ///
    /// # Safety
    ///
    /// - Must be called before the D-cache is enabled.
    /// - Must be called before any DMA stream is enabled.
    /// - Must be called from privileged mode with interrupts not yet running.
    #[allow(unsafe_code)]
    pub unsafe fn apply_mpu_config(mpu: &mut cortex_m::peripheral::MPU) {
        let Some((rbar, rasr)) = super::axi_sram_register_pair() else {
            return;
        };
        // MPU off while regions change (ARM DDI0489F §B3.5.1).
        unsafe {
            mpu.ctrl.write(0);
            mpu.rbar.write(rbar);
            mpu.rasr.write(rasr);
            mpu.ctrl.write(0b101); // ENABLE | PRIVDEFENA
        }
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
    }

    /// Zero-argument entry point for `main`: call before `embassy_stm32::init`.
    #[allow(unsafe_code)]
    pub fn apply_mpu_config_from_peripherals() {
        // SAFETY: boot context, before any task or interrupt handler runs; no
        // other code holds the Cortex-M peripherals yet.
        let mut cp = unsafe { cortex_m::Peripherals::steal() };
        // SAFETY: D-cache not yet enabled, no DMA stream running.
        unsafe { apply_mpu_config(&mut cp.MPU) };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_axi_sram_pair_matches_reference_values() {
        assert_eq!(axi_sram_register_pair(), Some((0x2400_0010, 0x1308_0025)));
    }

    #[test]
    fn test_rasr_size_field() {
        assert_eq!(rasr_size_field(32), Some(4 << 1));
        assert_eq!(rasr_size_field(512 * 1024), Some(18 << 1));
        assert_eq!(rasr_size_field(48), None);
        assert_eq!(rasr_size_field(16), None);
    }

    #[test]
    fn test_mpu_before_cache() {
        let mpu = BOOT_SEQUENCE_STEPS.iter().position(|s| s.contains("MPU")).unwrap();
        let cache = BOOT_SEQUENCE_STEPS.iter().position(|s| s.contains("D-cache")).unwrap();
        let dcmi = BOOT_SEQUENCE_STEPS.iter().position(|s| s.contains("DCMI")).unwrap();
        assert!(mpu < cache);
        assert!(cache < dcmi);
    }
}
