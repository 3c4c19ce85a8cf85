//! SPIFI pin and protocol setup.
//!
//! Runs before any clock change: the boot ROM leaves SPIFI executing from flash at boot
//! speed, and the pins and sampling mode must already suit the fast clock when
//! [`crate::rcc::configure_spifi_clock`] raises it.

// See `cgu.rs`: keep the bitfield-generated const code on the `core` panic and assert
// macros instead of the `defmt` forwarding ones from `fmt.rs`.
#[allow(unused_macros)]
macro_rules! panic {
    ($($x:tt)*) => {
        ::core::panic!($($x)*)
    };
}

#[allow(unused_macros)]
macro_rules! assert {
    ($($x:tt)*) => {
        ::core::assert!($($x)*)
    };
}

#[allow(unused_macros)]
macro_rules! debug_assert {
    ($($x:tt)*) => {
        ::core::debug_assert!($($x)*)
    };
}

use bitfield_struct::bitfield;

use crate::pac;
use crate::regs::RegisterFile;
use crate::scu::PinConfig;

/// SPIFI CTRL
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct SpifiCtrl {
    /// [15:0] TIMEOUT: serial clocks without a memory access before CS is deasserted
    pub timeout: u16,
    /// [19:16] CSHIGH: minimum CS high time, in serial clocks minus one
    #[bits(4)]
    pub cshigh: u8,
    #[bits(1)]
    __: u8,
    /// [21] D_PRFTCH_DIS: disable prefetch of data reads
    pub data_prefetch_disable: bool,
    /// [22] INTEN: interrupt on command completion
    pub inten: bool,
    /// [23] MODE3: SCK idles high
    pub mode3: bool,
    #[bits(3)]
    __: u8,
    /// [27] PRFTCH_DIS: disable cache prefetch
    pub prefetch_disable: bool,
    /// [28] DUAL: dual-line protocol instead of quad
    pub dual: bool,
    /// [29] RFCLK: sample read data on the falling edge
    pub rfclk: bool,
    /// [30] FBCLK: sample with the clock fed back from the SCK pad
    pub fbclk: bool,
    /// [31] DMAEN: DMA request output
    pub dmaen: bool,
}

/// How SPIFI captures read data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sampling {
    /// Rising edge of the internal serial clock.
    RisingEdge,
    /// Falling edge of the internal serial clock.
    FallingEdge,
    /// Falling edge of the clock returned from the SCK pad. Needed above ~60 MHz.
    FallingEdgeFeedback,
}

impl SpifiCtrl {
    /// Set RFCLK and FBCLK together. Feedback sampling is only offered with the falling edge.
    pub const fn with_sampling(self, sampling: Sampling) -> Self {
        match sampling {
            Sampling::RisingEdge => self.with_rfclk(false).with_fbclk(false),
            Sampling::FallingEdge => self.with_rfclk(true).with_fbclk(false),
            Sampling::FallingEdgeFeedback => self.with_rfclk(true).with_fbclk(true),
        }
    }

    /// Decoded sampling mode; `None` for the invalid rising-edge feedback combination.
    pub const fn sampling(&self) -> Option<Sampling> {
        match (self.rfclk(), self.fbclk()) {
            (false, false) => Some(Sampling::RisingEdge),
            (true, false) => Some(Sampling::FallingEdge),
            (true, true) => Some(Sampling::FallingEdgeFeedback),
            (false, true) => None,
        }
    }

    /// Quad mode, SCK idle low, 2-clock CS high time, longest CS timeout, no interrupt or DMA,
    /// feedback-clock sampling.
    pub const fn high_speed() -> Self {
        Self::new()
            .with_timeout(0xFFFF)
            .with_cshigh(1)
            .with_data_prefetch_disable(false)
            .with_inten(false)
            .with_mode3(false)
            .with_prefetch_disable(false)
            .with_dual(false)
            .with_dmaen(false)
            .with_sampling(Sampling::FallingEdgeFeedback)
    }
}

/// Route every SPIFI pin to SPIFI with one shared high-speed configuration word.
pub fn configure_pins(regs: &mut impl RegisterFile) {
    let config = PinConfig::high_speed(pac::SPIFI_PIN_FUNCTION);
    for pin in pac::SPIFI_PINS.iter() {
        pin.reg.write_value(regs, config);
        trace!("spifi: {} ({}) <- {:#04x}", pin.name, pin.signal, config.into_bits());
    }
}

/// Program CTRL for high-speed quad reads.
pub fn configure_interface(regs: &mut impl RegisterFile) {
    let ctrl = SpifiCtrl::high_speed();
    pac::spifi::CTRL.write_value(regs, ctrl);
    debug!("spifi: CTRL <- {:#010x}", ctrl.into_bits());
}
