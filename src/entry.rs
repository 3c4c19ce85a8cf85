//! Reset entry point for the M4 image.

use cortex_m_rt::entry;

use crate::{Bootstrap, Config, Mmio};

const CONFIG: Config = Config::new().checked();

#[entry]
fn main() -> ! {
    crate::system_init();
    info!("boot: M4 up, core {} MHz", CONFIG.core_clock().to_mhz());

    // SAFETY: sole execution context; the M0APP is still held in reset.
    let regs = unsafe { Mmio::steal() };
    Bootstrap::new(regs, CONFIG).start()
}
