//! CGU (clock generation unit) register words.
//!
//! Field layouts follow UM10503 chapter 13. Only the registers the bootstrap drives are
//! modelled: the crystal oscillator, PLL1, integer divider B and two base clocks.

// `bitfield-struct` generates `const fn` code that calls `panic!`, `assert!` and
// `debug_assert!` (bounds checks on setters). This crate's `fmt.rs` redefines all three to
// forward to `defmt` when `defmt` is enabled, which is not usable in const-eval. Shadow them
// here so the generated code uses the `core` versions.
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

/// CLK_SEL codes shared by every CGU output stage, divider and PLL input mux.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// 32 kHz oscillator
    Osc32k,
    /// 12 MHz internal RC oscillator
    Irc,
    /// ENET_RX_CLK
    EnetRxClk,
    /// ENET_TX_CLK
    EnetTxClk,
    /// GP_CLKIN
    GpClkin,
    /// Crystal oscillator
    Crystal,
    /// PLL0USB
    Pll0Usb,
    /// PLL0AUDIO
    Pll0Audio,
    /// PLL1
    Pll1,
    /// Integer divider A
    IdivA,
    /// Integer divider B
    IdivB,
    /// Integer divider C
    IdivC,
    /// Integer divider D
    IdivD,
    /// Integer divider E
    IdivE,
    /// Undefined code.
    Reserved(u8),
}

impl ClockSource {
    pub const fn into_bits(self) -> u8 {
        match self {
            ClockSource::Osc32k => 0x00,
            ClockSource::Irc => 0x01,
            ClockSource::EnetRxClk => 0x02,
            ClockSource::EnetTxClk => 0x03,
            ClockSource::GpClkin => 0x04,
            ClockSource::Crystal => 0x06,
            ClockSource::Pll0Usb => 0x07,
            ClockSource::Pll0Audio => 0x08,
            ClockSource::Pll1 => 0x09,
            ClockSource::IdivA => 0x0C,
            ClockSource::IdivB => 0x0D,
            ClockSource::IdivC => 0x0E,
            ClockSource::IdivD => 0x0F,
            ClockSource::IdivE => 0x10,
            ClockSource::Reserved(bits) => bits,
        }
    }

    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            0x00 => ClockSource::Osc32k,
            0x01 => ClockSource::Irc,
            0x02 => ClockSource::EnetRxClk,
            0x03 => ClockSource::EnetTxClk,
            0x04 => ClockSource::GpClkin,
            0x06 => ClockSource::Crystal,
            0x07 => ClockSource::Pll0Usb,
            0x08 => ClockSource::Pll0Audio,
            0x09 => ClockSource::Pll1,
            0x0C => ClockSource::IdivA,
            0x0D => ClockSource::IdivB,
            0x0E => ClockSource::IdivC,
            0x0F => ClockSource::IdivD,
            0x10 => ClockSource::IdivE,
            bits => ClockSource::Reserved(bits),
        }
    }
}

/// XTAL_OSC_CTRL
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct XtalOscCtrl {
    /// [0] ENABLE. Despite the name, 1 powers the oscillator pad down.
    pub pd: bool,
    /// [1] BYPASS: feed XTAL1 straight through (external clock instead of a crystal)
    pub bypass: bool,
    /// [2] HF: 15-25 MHz range when set, 1-20 MHz when clear
    pub hf: bool,
    #[bits(29)]
    __: u32,
}

/// PLL1_STAT
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct Pll1Stat {
    /// [0] LOCK
    pub lock: bool,
    #[bits(31)]
    __: u32,
}

/// PLL1_CTRL
///
/// - non-integer mode (FBSEL = 0): F_CCO = M * F_in / N, F_out = F_CCO / (2 * P)
/// - integer mode (FBSEL = 1): F_out = M * F_in / N, F_CCO = F_out * 2 * P
/// - DIRECT = 1: F_out = M * F_in / N, post-divider bypassed
///
/// with M = MSEL + 1, N = NSEL + 1, P = 2^PSEL.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct Pll1Ctrl {
    /// [0] PD
    pub pd: bool,
    /// [1] BYPASS
    pub bypass: bool,
    #[bits(4)]
    __: u8,
    /// [6] FBSEL: feedback from PLL output (integer mode) instead of the CCO
    pub fbsel: bool,
    /// [7] DIRECT: bypass the post-divider
    pub direct: bool,
    /// [9:8] PSEL: post-divider, P = 2^PSEL
    #[bits(2)]
    pub psel: u8,
    #[bits(1)]
    __: u8,
    /// [11] AUTOBLOCK
    pub autoblock: bool,
    /// [13:12] NSEL: pre-divider, N = NSEL + 1
    #[bits(2)]
    pub nsel: u8,
    #[bits(2)]
    __: u8,
    /// [23:16] MSEL: feedback divider, M = MSEL + 1
    pub msel: u8,
    /// [28:24] CLK_SEL
    #[bits(5)]
    pub clk_sel: ClockSource,
    #[bits(3)]
    __: u8,
}

impl Pll1Ctrl {
    /// Feedback multiplier M.
    pub const fn m(&self) -> u32 {
        self.msel() as u32 + 1
    }

    /// Pre-divider N.
    pub const fn n(&self) -> u32 {
        self.nsel() as u32 + 1
    }

    /// Post-divider P.
    pub const fn p(&self) -> u32 {
        1 << self.psel()
    }
}

/// IDIVx_CTRL (integer dividers A..E; B, C and D share this 4-bit layout)
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct IdivCtrl {
    /// [0] PD
    pub pd: bool,
    #[bits(1)]
    __: u8,
    /// [5:2] IDIV: divide by IDIV + 1
    #[bits(4)]
    pub idiv: u8,
    #[bits(5)]
    __: u8,
    /// [11] AUTOBLOCK
    pub autoblock: bool,
    #[bits(12)]
    __: u16,
    /// [28:24] CLK_SEL
    #[bits(5)]
    pub clk_sel: ClockSource,
    #[bits(3)]
    __: u8,
}

impl IdivCtrl {
    /// Integer divide ratio.
    pub const fn ratio(&self) -> u32 {
        self.idiv() as u32 + 1
    }
}

/// BASE_xxx_CLK output stage control
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct BaseClk {
    /// [0] PD
    pub pd: bool,
    #[bits(10)]
    __: u16,
    /// [11] AUTOBLOCK
    pub autoblock: bool,
    #[bits(12)]
    __: u16,
    /// [28:24] CLK_SEL
    #[bits(5)]
    pub clk_sel: ClockSource,
    #[bits(3)]
    __: u8,
}
