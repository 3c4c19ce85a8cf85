//! Secondary core (Cortex-M0 "M0APP") handoff.
//!
//! The M0APP comes out of reset fetching from address 0, which CREG.M0APPMEMMAP maps onto
//! real memory. Remap first, then release: the core starts fetching the moment its reset
//! request is cleared.

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

use core::sync::atomic::{compiler_fence, Ordering};

use bitfield_struct::bitfield;

use crate::pac::{creg, rgu};
use crate::rcc::Config;
use crate::regs::RegisterFile;

/// RGU RESET_CTRL1. Write-only; a set bit holds the peripheral in reset.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct ResetCtrl1 {
    #[bits(24)]
    __: u32,
    /// [24] M0APP_RST
    pub m0app_rst: bool,
    #[bits(7)]
    __: u8,
}

/// Point the M0APP's address 0 at `base` and return the value read back.
pub fn remap(regs: &mut impl RegisterFile, base: u32) -> u32 {
    creg::M0APPMEMMAP.write_value(regs, base);
    compiler_fence(Ordering::SeqCst);
    let mapped = creg::M0APPMEMMAP.read(regs);
    debug!("m0app: M0APPMEMMAP = {:#010x}", mapped);
    mapped
}

/// Let the M0APP run.
///
/// RESET_CTRL1 cannot be read, so the whole word is written with every request cleared.
pub fn release(regs: &mut impl RegisterFile) {
    compiler_fence(Ordering::SeqCst);
    rgu::RESET_CTRL1.write(regs, |w| w.set_m0app_rst(false));
}

/// Remap the M0APP onto its image in cached SPIFI flash, then start it.
pub fn handoff(regs: &mut impl RegisterFile, config: &Config) {
    let mapped = remap(regs, config.m0app_base());
    if mapped != config.m0app_base() {
        warn!(
            "m0app: M0APPMEMMAP reads {:#010x}, wrote {:#010x}",
            mapped,
            config.m0app_base()
        );
    }
    release(regs);
    info!("m0app: released at {:#010x}", config.m0app_base());
}
