//! Clock constants and read-back of the CGU state.

use crate::cgu::{BaseClk, ClockSource, IdivCtrl, Pll1Ctrl};
use crate::pac::cgu;
use crate::regs::RegisterFile;
use crate::time::Hertz;

// =============================================================================
// Constants
// =============================================================================

/// Internal RC oscillator. Factory trimmed to +/-1 %.
pub const CLK_IRC_FREQ: Hertz = Hertz(12_000_000);

/// PLL1 current-controlled oscillator range.
pub const PLL1_CCO_MIN: Hertz = Hertz(156_000_000);
pub const PLL1_CCO_MAX: Hertz = Hertz(320_000_000);

/// Fastest BASE_M4_CLK the LPC43xx is rated for.
pub const CORE_CLK_MAX: Hertz = Hertz(204_000_000);

/// Fastest BASE_SPIFI_CLK the interface is rated for.
pub const SPIFI_CLK_MAX: Hertz = Hertz(104_000_000);

// =============================================================================
// Read-back
// =============================================================================

/// Frequencies decoded from the CGU registers. `None` means powered down or driven from a
/// source this crate does not track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clocks {
    pub pll1: Option<Hertz>,
    pub m4: Option<Hertz>,
    pub idivb: Option<Hertz>,
    pub spifi: Option<Hertz>,
}

/// Decode the clock tree from register state alone.
///
/// `xtal` is the crystal frequency; the registers cannot tell it.
pub fn read_clocks(regs: &mut impl RegisterFile, xtal: Hertz) -> Clocks {
    let xtal = if cgu::XTAL_OSC_CTRL.read(regs).pd() {
        None
    } else {
        Some(xtal)
    };

    let pll1 = pll1_freq(cgu::PLL1_CTRL.read(regs), xtal);
    let idivb = idiv_freq(cgu::IDIVB_CTRL.read(regs), xtal, pll1);
    let m4 = base_freq(cgu::BASE_M4_CLK.read(regs), xtal, pll1, idivb);
    let spifi = base_freq(cgu::BASE_SPIFI_CLK.read(regs), xtal, pll1, idivb);

    Clocks {
        pll1,
        m4,
        idivb,
        spifi,
    }
}

fn oscillator(source: ClockSource, xtal: Option<Hertz>) -> Option<Hertz> {
    match source {
        ClockSource::Irc => Some(CLK_IRC_FREQ),
        ClockSource::Crystal => xtal,
        _ => None,
    }
}

fn pll1_freq(ctrl: Pll1Ctrl, xtal: Option<Hertz>) -> Option<Hertz> {
    if ctrl.pd() {
        return None;
    }
    let input = oscillator(ctrl.clk_sel(), xtal)?;
    let post_div = if ctrl.direct() { 1 } else { 2 * ctrl.p() };

    if ctrl.bypass() {
        return Some(input / post_div);
    }

    let out = input.0 as u64 * ctrl.m() as u64 / ctrl.n() as u64;
    // Integer mode feeds back from after the post-divider: F_out = M * F_in / N either way.
    let out = if ctrl.fbsel() { out } else { out / post_div as u64 };
    Some(Hertz(out as u32))
}

fn idiv_freq(ctrl: IdivCtrl, xtal: Option<Hertz>, pll1: Option<Hertz>) -> Option<Hertz> {
    if ctrl.pd() {
        return None;
    }
    let input = match ctrl.clk_sel() {
        ClockSource::Pll1 => pll1?,
        source => oscillator(source, xtal)?,
    };
    Some(input / ctrl.ratio())
}

fn base_freq(
    ctrl: BaseClk,
    xtal: Option<Hertz>,
    pll1: Option<Hertz>,
    idivb: Option<Hertz>,
) -> Option<Hertz> {
    if ctrl.pd() {
        return None;
    }
    match ctrl.clk_sel() {
        ClockSource::Pll1 => pll1,
        ClockSource::IdivB => idivb,
        source => oscillator(source, xtal),
    }
}
