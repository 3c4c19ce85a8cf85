//! The M4 boot sequence.
//!
//! ```text
//! Reset
//!   -> InterfaceConfigured   SPIFI pins and CTRL
//!   -> Clock(..)             PLL1 ramp, one `ClockState` per step
//!   -> InterfaceFast         SPIFI clock from PLL1 / 2
//!   -> Released              M0APP remapped and out of reset
//! ```
//!
//! Each stage is entered once. The only way to stop short of `Released` is a PLL1 that never
//! locks, which leaves the sequence in `Clock(PllLockWait)`.

use crate::m0app;
use crate::rcc::{self, ClockState, Config};
use crate::regs::RegisterFile;
use crate::spifi;

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    Reset,
    InterfaceConfigured,
    Clock(ClockState),
    InterfaceFast,
    Released,
}

/// Sequencer over an injected register file.
pub struct Bootstrap<R: RegisterFile> {
    regs: R,
    config: Config,
    stage: Stage,
}

impl<R: RegisterFile> Bootstrap<R> {
    pub fn new(regs: R, config: Config) -> Self {
        config.check();
        Self {
            regs,
            config,
            stage: Stage::Reset,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Perform one transition and return the stage reached.
    pub fn step(&mut self) -> Stage {
        let regs = &mut self.regs;
        let next = match self.stage {
            Stage::Reset => {
                spifi::configure_pins(regs);
                spifi::configure_interface(regs);
                Stage::InterfaceConfigured
            }
            Stage::InterfaceConfigured => {
                Stage::Clock(rcc::escalate_step(regs, &self.config, ClockState::Boot))
            }
            Stage::Clock(ClockState::PllDirect) => {
                rcc::configure_spifi_clock(regs, &self.config);
                #[cfg(any(feature = "defmt", feature = "log"))]
                {
                    let clocks = rcc::read_clocks(regs, self.config.xtal);
                    info!("boot: clocks {:?}", clocks);
                }
                Stage::InterfaceFast
            }
            Stage::Clock(state) => {
                Stage::Clock(rcc::escalate_step(regs, &self.config, state))
            }
            Stage::InterfaceFast => {
                m0app::handoff(regs, &self.config);
                Stage::Released
            }
            Stage::Released => Stage::Released,
        };

        if next != self.stage {
            debug!("boot: {:?} -> {:?}", self.stage, next);
        }
        self.stage = next;
        next
    }

    /// Step until the M0APP is released. Never returns if PLL1 does not lock.
    pub fn run(&mut self) {
        while self.step() != Stage::Released {}
    }

    /// Run the whole sequence and park the M4.
    pub fn start(mut self) -> ! {
        self.run();
        park()
    }
}

/// Sleep until an event, forever.
pub fn park() -> ! {
    loop {
        #[cfg(target_arch = "arm")]
        cortex_m::asm::wfe();
        #[cfg(not(target_arch = "arm"))]
        core::hint::spin_loop();
    }
}
