//! STM32H743 DCMI binding.
//!
//! embassy-stm32 0.1.0 only offers whole-frame DCMI captures, so this module
//! drives the peripheral through `embassy_stm32::pac`:
//!
//! - DCMI in continuous 8-bit mode with VSYNC, line and overrun interrupts
//! - DMA2 stream 1 (DMAMUX1 channel 9, request 75) in double-buffer mode,
//!   one line per transfer, alternating between two [`LineBuffer`]s
//! - the DCMI line interrupt hands the buffer the stream just left to the
//!   capture engine while the stream fills the other one
//!
//! The stream's own interrupt stays masked: embassy-stm32 owns the
//! `DMA2_STR1` vector.
//!
//! # Pin assignments (AF13)
//!
//! | Signal | Pin  |   | Signal | Pin |
//! |--------|------|---|--------|-----|
//! | HSYNC  | PA4  |   | D3     | PC9 |
//! | PIXCLK | PA6  |   | D4     | PC11|
//! | VSYNC  | PB7  |   | D5     | PB6 |
//! | D0     | PC6  |   | D6     | PB8 |
//! | D1     | PC7  |   | D7     | PB9 |
//! | D2     | PC8  |   |        |     |

use capture::CameraDriver;
use embassy_stm32::pac;
use embassy_stm32::pac::dma::vals;
use embedded_hal::digital::OutputPin;
use platform::dma_safety::{
    line_tail_in_flight, line_transfer_is_legal, Align32, DMA_TRANSFER_ALIGN_BYTES, LINE_BUFFER_COUNT,
    MAX_LINE_BUFFER_BYTES,
};
use platform::{BufferRing, CopyAssist, CsiConfig, CsiPeripheral};

/// One DMA line buffer (cache-line aligned, placed in AXI SRAM).
pub type LineBuffer = Align32<[u8; MAX_LINE_BUFFER_BYTES]>;

/// The double-buffered line pair.
pub type LineBuffers = [LineBuffer; LINE_BUFFER_COUNT];

const DMA_STREAM: usize = 1;
const DMAMUX_CHANNEL: usize = 9;
const DMAMUX_REQ_DCMI: u8 = 75;
const DCMI_AF: u8 = 13;
/// NDTR polls before giving up on the FIFO drain (a few hundred ns at
/// 200 MHz AHB, well under one pixel-clock line).
const DRAIN_SPIN_LIMIT: u32 = 64;

/// `(port, pin)` pairs routed to the DCMI.
const DCMI_PINS: [(pac::gpio::Gpio, usize); 11] = [
    (pac::GPIOA, 4),
    (pac::GPIOA, 6),
    (pac::GPIOB, 6),
    (pac::GPIOB, 7),
    (pac::GPIOB, 8),
    (pac::GPIOB, 9),
    (pac::GPIOC, 6),
    (pac::GPIOC, 7),
    (pac::GPIOC, 8),
    (pac::GPIOC, 9),
    (pac::GPIOC, 11),
];

/// Configuration rejected by the DCMI/DMA pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum DcmiError {
    /// Line does not fit a line buffer or is not a whole number of words.
    IllegalLine,
    /// Line needs more DMA beats than NDTR can count.
    TooManyBeats,
}

/// Interrupt causes latched by the DCMI.
#[derive(Debug, Clone, Copy, Default, defmt::Format)]
pub struct DcmiEvents {
    /// VSYNC: a new frame is starting.
    pub start_of_frame: bool,
    /// HSYNC: a line has been received.
    pub line: bool,
    /// Data arrived while the DMA was not reading.
    pub overrun: bool,
}

/// DCMI + DMA2 stream 1 as a [`CsiPeripheral`].
pub struct DcmiCsi {
    buffer_addresses: [u32; LINE_BUFFER_COUNT],
    line_bytes: usize,
    enabled: bool,
    dma_request: bool,
}

impl DcmiCsi {
    /// Enable the DCMI clock, route its pins and point the DMA stream at
    /// `buffers`. Call once after `embassy_stm32::init`.
    pub fn new(buffers: &'static LineBuffers) -> Self {
        pac::RCC.ahb2enr().modify(|w| w.set_dcmien(true));
        for (port, pin) in DCMI_PINS {
            port.moder().modify(|w| w.set_moder(pin, pac::gpio::vals::Moder::ALTERNATE));
            port.ospeedr()
                .modify(|w| w.set_ospeedr(pin, pac::gpio::vals::Ospeedr::VERYHIGHSPEED));
            port.afr(pin / 8).modify(|w| w.set_afr(pin % 8, DCMI_AF));
        }
        pac::DMAMUX1
            .ccr(DMAMUX_CHANNEL)
            .modify(|w| w.set_dmareq_id(DMAMUX_REQ_DCMI));

        let address = |b: &LineBuffer| b.0.as_ptr() as u32;
        Self {
            buffer_addresses: [address(&buffers[0]), address(&buffers[1])],
            line_bytes: 0,
            enabled: false,
            dma_request: false,
        }
    }

    /// Bytes per line of the current configuration.
    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// `true` while the DMA stream is moving lines.
    pub fn dma_request_enabled(&self) -> bool {
        self.dma_request
    }

    /// Index of the line buffer the stream just finished: the one it is
    /// not currently targeting.
    ///
    /// The LINE flag is raised at the end of HSYNC, when up to one DCMI
    /// FIFO of the line may still be in flight to memory. While NDTR shows
    /// only that tail outstanding, `CT` still names the line that just
    /// ended, so wait for the stream to reload before reading it.
    pub fn completed_buffer(&self) -> usize {
        let stream = pac::DMA2.st(DMA_STREAM);
        for _ in 0..DRAIN_SPIN_LIMIT {
            if !line_tail_in_flight(usize::from(stream.ndtr().read().ndt())) {
                break;
            }
        }
        if stream.cr().read().ct() == vals::Ct::MEMORY0 {
            1
        } else {
            0
        }
    }

    /// Read and clear the DCMI interrupt flags.
    pub fn take_events() -> DcmiEvents {
        let mis = pac::DCMI.mis().read();
        pac::DCMI.icr().write(|w| {
            w.set_vsync_isc(true);
            w.set_ovr_isc(true);
            w.set_err_isc(true);
            w.set_frame_isc(true);
            w.set_line_isc(true);
        });
        DcmiEvents {
            start_of_frame: mis.vsync_mis(),
            line: mis.line_mis(),
            overrun: mis.ovr_mis(),
        }
    }

    fn start_stream(&self) -> Result<(), DcmiError> {
        let beats = self.line_bytes / DMA_TRANSFER_ALIGN_BYTES;
        let beats = u16::try_from(beats).map_err(|_| DcmiError::TooManyBeats)?;
        let stream = pac::DMA2.st(DMA_STREAM);
        stream.cr().modify(|w| w.set_en(false));
        while stream.cr().read().en() {}
        stream.par().write_value(pac::DCMI.dr().as_ptr() as u32);
        stream.m0ar().write_value(self.buffer_addresses[0]);
        stream.m1ar().write_value(self.buffer_addresses[1]);
        stream.ndtr().write(|w| w.set_ndt(beats));
        stream.cr().write(|w| {
            w.set_dir(vals::Dir::PERIPHERALTOMEMORY);
            w.set_psize(vals::Size::BITS32);
            w.set_msize(vals::Size::BITS32);
            w.set_minc(true);
            w.set_circ(true);
            w.set_dbm(true);
            w.set_ct(vals::Ct::MEMORY0);
            w.set_pl(vals::Pl::VERYHIGH);
        });
        stream.cr().modify(|w| w.set_en(true));
        Ok(())
    }

    fn stop_stream() {
        let stream = pac::DMA2.st(DMA_STREAM);
        stream.cr().modify(|w| w.set_en(false));
    }
}

impl CsiPeripheral for DcmiCsi {
    type Error = DcmiError;

    fn configure(&mut self, config: &CsiConfig) -> Result<(), Self::Error> {
        if !line_transfer_is_legal(config.line_bytes, DMA_TRANSFER_ALIGN_BYTES, MAX_LINE_BUFFER_BYTES) {
            return Err(DcmiError::IllegalLine);
        }
        self.line_bytes = config.line_bytes;
        pac::DCMI.cr().write(|w| {
            w.set_cm(false); // continuous grab
            w.set_jpeg(config.jpeg);
            w.set_edm(0); // 8-bit bus
            w.set_pckpol(true);
        });
        defmt::debug!(
            "DCMI configured: {=usize} byte lines, {=usize} lines, jpeg={=bool}",
            config.line_bytes,
            config.lines_per_frame,
            config.jpeg
        );
        Ok(())
    }

    fn enable(&mut self) {
        pac::DCMI.cr().modify(|w| {
            w.set_enable(true);
            w.set_capture(true);
        });
        self.enabled = true;
    }

    fn disable(&mut self) {
        pac::DCMI.cr().modify(|w| {
            w.set_capture(false);
            w.set_enable(false);
        });
        Self::stop_stream();
        self.dma_request = false;
        self.enabled = false;
    }

    fn set_interrupts(&mut self, enabled: bool) {
        pac::DCMI.ier().write(|w| {
            w.set_vsync_ie(enabled);
            w.set_line_ie(enabled);
            w.set_ovr_ie(enabled);
        });
    }

    fn set_dma_request(&mut self, enabled: bool) {
        if enabled == self.dma_request {
            return;
        }
        if enabled {
            if self.start_stream().is_err() {
                defmt::warn!("DMA stream rejected {=usize} byte line", self.line_bytes);
                return;
            }
        } else {
            Self::stop_stream();
        }
        self.dma_request = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// ── Interrupt glue ───────────────────────────────────────────────────────────

/// Body of the `DCMI` interrupt handler.
///
/// A line latched together with VSYNC belongs to the frame that is ending,
/// so it is delivered before the start of frame.
pub fn on_dcmi_interrupt<R, A, P>(driver: &CameraDriver<DcmiCsi, R, A, P>, lines: &LineBuffers)
where
    R: BufferRing,
    A: CopyAssist,
    P: OutputPin,
{
    let events = DcmiCsi::take_events();
    if events.overrun {
        defmt::trace!("DCMI overrun");
    }
    if events.line {
        let (index, len, open) = driver.lock(|e| {
            let csi = e.csi();
            (csi.completed_buffer(), csi.line_bytes(), csi.dma_request_enabled())
        });
        if open {
            if let Some(line) = lines.get(index).and_then(|b| b.0.get(..len)) {
                driver.on_line_ready(line);
            }
        }
    }
    if events.start_of_frame {
        driver.on_start_of_frame();
    }
}
