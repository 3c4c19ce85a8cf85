//! Clock tree bring-up: PLL1 escalation to the final core clock and the SPIFI clock.

mod clock;
pub use clock::*;

mod clock_config;
pub use clock_config::*;

pub use crate::cgu::ClockSource;
