//! Counted busy-wait.
//!
//! No timer is running this early, so delays are counted in core cycles through
//! `cortex_m::asm::delay`. Counts are computed for an upper bound of the core clock at the
//! time the wait runs; a slower clock only makes the wait longer.

use crate::time::Hertz;

/// Core cycles per [`Iterations`] unit, as handed to `cortex_m::asm::delay`.
pub const CYCLES_PER_ITERATION: u32 = 4;

/// Length of a [`spin`], in units of [`CYCLES_PER_ITERATION`] core cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Iterations(pub u32);

impl Iterations {
    /// Iterations needed to wait at least `us` microseconds with the core at `clock`.
    pub const fn for_micros(us: u32, clock: Hertz) -> Self {
        let cycles = us as u64 * clock.0 as u64;
        let per_iteration = CYCLES_PER_ITERATION as u64 * 1_000_000;
        Self(cycles.div_ceil(per_iteration) as u32)
    }

    /// Core cycles the wait lasts at least.
    pub const fn cycles(self) -> u32 {
        self.0.saturating_mul(CYCLES_PER_ITERATION)
    }
}

/// Spin for `iterations` and return how many were performed.
#[cfg(target_arch = "arm")]
#[inline(never)]
pub fn spin(iterations: Iterations) -> u32 {
    cortex_m::asm::delay(iterations.cycles());
    iterations.0
}

/// Spin for `iterations` and return how many were performed.
#[cfg(not(target_arch = "arm"))]
#[inline(never)]
pub fn spin(iterations: Iterations) -> u32 {
    let mut remaining = iterations.0;
    let mut performed = 0;
    while core::hint::black_box(remaining) != 0 {
        remaining -= 1;
        performed += 1;
    }
    performed
}
