use crate::cgu::{BaseClk, ClockSource, IdivCtrl, Pll1Ctrl, XtalOscCtrl};
use crate::delay::{self, Iterations};
use crate::pac::{cgu, memory};
use crate::regs::RegisterFile;
use crate::time::Hertz;

use super::clock::{CORE_CLK_MAX, PLL1_CCO_MAX, PLL1_CCO_MIN, SPIFI_CLK_MAX};

/// The frequency plan: crystal, PLL1 dividers, SPIFI divider, settle times and the M0APP
/// image location.
///
/// Built with [`Config::new()`] and validated at compile time with
/// `const { Config::new().checked() }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Crystal on XTAL1/XTAL2.
    pub xtal: Hertz,
    /// Clock the crystal settle wait is calibrated at. The wait runs right after the core is
    /// switched to the 12 MHz IRC, so this is a conservative bound well above the real clock,
    /// covering any clock the boot ROM may have left running.
    pub boot_clock_max: Hertz,
    /// PLL1 feedback multiplier M, 1..=256.
    pub pll1_m: u16,
    /// PLL1 pre-divider N, 1..=4.
    pub pll1_n: u8,
    /// PLL1 post-divider P, one of 1, 2, 4, 8. Only used until direct mode.
    pub pll1_p: u8,
    /// IDIVB ratio feeding BASE_SPIFI_CLK from PLL1, 1..=16.
    pub spifi_div: u8,
    /// Crystal oscillator start-up wait, microseconds.
    pub xtal_settle_us: u32,
    /// Wait between running the core from divided PLL1 and switching PLL1 to direct mode,
    /// microseconds.
    pub direct_settle_us: u32,
    /// Offset of the M0APP image inside the cached SPIFI window.
    pub m0app_offset: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// 12 MHz crystal, PLL1 at 17x (204 MHz), SPIFI at 102 MHz, M0APP image 256 KiB into flash.
    pub const fn new() -> Self {
        Self {
            xtal: Hertz(12_000_000),
            boot_clock_max: Hertz(110_000_000),
            pll1_m: 17,
            pll1_n: 1,
            pll1_p: 1,
            spifi_div: 2,
            xtal_settle_us: 250,
            direct_settle_us: 50,
            m0app_offset: 0x0004_0000,
        }
    }

    /// Validate the plan.
    ///
    /// Note: Uses `::core::panic!` to bypass defmt's panic override,
    /// which is not const-compatible.
    pub const fn check(&self) {
        if self.xtal.0 == 0 {
            ::core::panic!("crystal frequency is zero");
        }
        if self.boot_clock_max.0 == 0 {
            ::core::panic!("boot clock upper bound is zero");
        }

        if self.pll1_m == 0 || self.pll1_m > 256 {
            ::core::panic!("PLL1 multiplier M out of range (1..=256)");
        }
        if self.pll1_n == 0 || self.pll1_n > 4 {
            ::core::panic!("PLL1 pre-divider N out of range (1..=4)");
        }
        match self.pll1_p {
            1 | 2 | 4 | 8 => {}
            _ => ::core::panic!("PLL1 post-divider P must be 1, 2, 4 or 8"),
        }

        let cco = self.pll1_cco_hz();
        if cco < PLL1_CCO_MIN.0 as u64 || cco > PLL1_CCO_MAX.0 as u64 {
            ::core::panic!("PLL1 CCO frequency out of valid range (156-320 MHz)");
        }
        if self.core_clock_hz() > CORE_CLK_MAX.0 {
            ::core::panic!("core clock exceeds maximum limit (204 MHz)");
        }

        if self.spifi_div == 0 || self.spifi_div > 16 {
            ::core::panic!("SPIFI divider out of IDIVB range (1..=16)");
        }
        if self.spifi_clock_hz() > SPIFI_CLK_MAX.0 {
            ::core::panic!("SPIFI clock exceeds maximum limit (104 MHz)");
        }

        if self.m0app_offset as usize >= memory::SPIFI_DATA_CACHED_SIZE {
            ::core::panic!("M0APP image offset outside the cached SPIFI window");
        }
        if self.m0app_offset % 0x1000 != 0 {
            ::core::panic!("M0APP image offset must be 4 KiB aligned");
        }
    }

    /// Validate and return the plan. Use in `const { }` blocks for compile-time checking.
    ///
    /// ```rust,ignore
    /// const { lpc43xx_bootstrap::Config::new().checked() }
    /// ```
    pub const fn checked(self) -> Config {
        self.check();
        self
    }

    const fn pll1_cco_hz(&self) -> u64 {
        self.xtal.0 as u64 * self.pll1_m as u64 / self.pll1_n as u64
    }

    /// PLL1 output while still post-divided.
    pub const fn pll1_divided(&self) -> Hertz {
        Hertz((self.pll1_cco_hz() / (2 * self.pll1_p as u64)) as u32)
    }

    const fn core_clock_hz(&self) -> u32 {
        self.pll1_cco_hz() as u32
    }

    /// Final core clock, PLL1 in direct mode.
    pub const fn core_clock(&self) -> Hertz {
        Hertz(self.core_clock_hz())
    }

    const fn spifi_clock_hz(&self) -> u32 {
        self.core_clock_hz() / self.spifi_div as u32
    }

    /// Final SPIFI clock.
    pub const fn spifi_clock(&self) -> Hertz {
        Hertz(self.spifi_clock_hz())
    }

    /// Address the M0APP fetches from once remapped.
    pub const fn m0app_base(&self) -> u32 {
        (memory::SPIFI_DATA_CACHED_BASE as u32) + self.m0app_offset
    }

    /// Crystal settle wait, calibrated at `boot_clock_max`.
    pub const fn xtal_settle(&self) -> Iterations {
        Iterations::for_micros(self.xtal_settle_us, self.boot_clock_max)
    }

    /// Runs with the core on divided PLL1; calibrated at the final clock as the upper bound.
    pub const fn direct_settle(&self) -> Iterations {
        Iterations::for_micros(self.direct_settle_us, self.core_clock())
    }

    /// PLL1 from the crystal, powered, not bypassed, post-divided, autoblock on.
    pub const fn pll1_ctrl(&self) -> Pll1Ctrl {
        Pll1Ctrl::new()
            .with_pd(false)
            .with_bypass(false)
            .with_fbsel(false)
            .with_direct(false)
            .with_psel(self.pll1_p.trailing_zeros() as u8)
            .with_autoblock(true)
            .with_nsel(self.pll1_n - 1)
            .with_msel((self.pll1_m - 1) as u8)
            .with_clk_sel(ClockSource::Crystal)
    }

    /// IDIVB dividing PLL1 by `spifi_div`.
    pub const fn idivb_ctrl(&self) -> IdivCtrl {
        IdivCtrl::new()
            .with_pd(false)
            .with_idiv(self.spifi_div - 1)
            .with_autoblock(true)
            .with_clk_sel(ClockSource::Pll1)
    }
}

/// Output stage running from `source` with autoblock.
pub const fn base_clk(source: ClockSource) -> BaseClk {
    BaseClk::new()
        .with_pd(false)
        .with_autoblock(true)
        .with_clk_sel(source)
}

/// Clock escalation states, in order. Each names the work already done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    /// Whatever the boot ROM left.
    Boot,
    /// Core on the IRC with autoblock, crystal oscillator programmed.
    Precondition,
    /// Crystal start-up wait done.
    Settle1,
    /// PLL1 programmed from the crystal, post-divided.
    PllConfiguring,
    /// Polling PLL1_STAT. Without lock the escalator stays here forever.
    PllLockWait,
    /// Core running from divided PLL1.
    PllLockedDivided,
    /// Direct-mode settle wait done.
    Settle2,
    /// PLL1 in direct mode, core at the final clock.
    PllDirect,
}

/// Perform one escalation transition from `state` and return the new state.
///
/// A lock poll that does not see PLL1_STAT.LOCK returns [`ClockState::PllLockWait`] again.
/// [`ClockState::PllDirect`] is terminal and touches nothing.
pub fn escalate_step(
    regs: &mut impl RegisterFile,
    config: &Config,
    state: ClockState,
) -> ClockState {
    match state {
        ClockState::Boot => {
            cgu::BASE_M4_CLK.write_value(regs, base_clk(ClockSource::Irc));
            cgu::XTAL_OSC_CTRL.write_value(regs, XtalOscCtrl::new());
            ClockState::Precondition
        }
        ClockState::Precondition => {
            let n = delay::spin(config.xtal_settle());
            trace!("rcc: crystal settle, {} iterations", n);
            ClockState::Settle1
        }
        ClockState::Settle1 => {
            let ctrl = config.pll1_ctrl();
            cgu::PLL1_CTRL.write_value(regs, ctrl);
            debug!("rcc: PLL1_CTRL <- {:#010x}", ctrl.into_bits());
            ClockState::PllConfiguring
        }
        ClockState::PllConfiguring => ClockState::PllLockWait,
        ClockState::PllLockWait => {
            if !cgu::PLL1_STAT.read(regs).lock() {
                return ClockState::PllLockWait;
            }
            cgu::BASE_M4_CLK.write_value(regs, base_clk(ClockSource::Pll1));
            ClockState::PllLockedDivided
        }
        ClockState::PllLockedDivided => {
            let n = delay::spin(config.direct_settle());
            trace!("rcc: direct-mode settle, {} iterations", n);
            ClockState::Settle2
        }
        ClockState::Settle2 => {
            cgu::PLL1_CTRL.modify(regs, |w| w.set_direct(true));
            ClockState::PllDirect
        }
        ClockState::PllDirect => ClockState::PllDirect,
    }
}

/// Drive PLL1 from whatever the boot ROM left to `config.core_clock()`.
///
/// Blocks forever if PLL1 never locks.
pub fn escalate(regs: &mut impl RegisterFile, config: &Config) {
    let mut state = ClockState::Boot;
    while state != ClockState::PllDirect {
        state = escalate_step(regs, config, state);
    }
}

/// Feed SPIFI from PLL1 through IDIVB. PLL1 must already be at its final frequency.
pub fn configure_spifi_clock(regs: &mut impl RegisterFile, config: &Config) {
    cgu::IDIVB_CTRL.write_value(regs, config.idivb_ctrl());
    cgu::BASE_SPIFI_CLK.write_value(regs, base_clk(ClockSource::IdivB));
    debug!("rcc: SPIFI clock {} MHz", config.spifi_clock().to_mhz());
}
