#![no_std]
#![doc = include_str!("../README.md")]

#[cfg(test)]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod time;
pub mod regs;
pub mod cgu;
pub mod scu;
pub mod spifi;
pub mod delay;
pub mod rcc;
pub mod m0app;
pub mod boot;

#[cfg(all(feature = "rt", target_os = "none"))]
mod entry;

/// Register addresses, memory regions and the SPIFI pin table, generated from
/// `data/lpc43xx/*.yaml`.
pub mod pac {
    #![allow(dead_code)]
    #![allow(non_snake_case)]
    #![allow(missing_docs)]
    #![allow(clippy::all)]

    include!(concat!(env!("OUT_DIR"), "/_generated.rs"));
}

// Reexports
pub use boot::{park, Bootstrap, Stage};
pub use rcc::Config;
pub use regs::{Mmio, RegisterFile};

/// Startup hook run by the C runtime convention after `.data`/`.bss` init. Nothing to do: the
/// clock tree is brought up by [`Bootstrap`].
pub fn system_init() {}

/// CMSIS name for [`system_init`].
#[cfg(target_os = "none")]
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn SystemInit() {
    system_init()
}
