//! Simulated register file for host tests.
//!
//! Words live in a map, every access is logged in order, and PLL1 reports lock only after it
//! has been powered up on the crystal and polled a configurable number of times.

extern crate std;

use std::collections::BTreeMap;
use std::vec::Vec;

use super::RegisterFile;
use crate::cgu::{BaseClk, ClockSource, IdivCtrl, Pll1Ctrl, Pll1Stat};
use crate::m0app::ResetCtrl1;
use crate::pac::{cgu, rgu};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read { addr: usize, value: u32 },
    Write { addr: usize, value: u32 },
}

impl Access {
    pub fn addr(&self) -> usize {
        match *self {
            Access::Read { addr, .. } | Access::Write { addr, .. } => addr,
        }
    }
}

pub struct SimRegisters {
    words: BTreeMap<usize, u32>,
    pub log: Vec<Access>,
    /// Polls of PLL1_STAT, with PLL1 running from the crystal, that still read unlocked.
    lock_after: Option<u32>,
    polls: u32,
}

impl SimRegisters {
    /// State left by the boot ROM: core on the IRC, PLL1 off, M0APP held in reset.
    pub fn after_boot_rom() -> Self {
        Self::with_lock_after(3)
    }

    /// PLL1 locks on poll `polls + 1`.
    pub fn with_lock_after(polls: u32) -> Self {
        let mut words = BTreeMap::new();
        words.insert(
            cgu::BASE_M4_CLK.addr(),
            BaseClk::new().with_clk_sel(ClockSource::Irc).into_bits(),
        );
        words.insert(
            cgu::PLL1_CTRL.addr(),
            Pll1Ctrl::new()
                .with_pd(true)
                .with_bypass(true)
                .with_clk_sel(ClockSource::Irc)
                .into_bits(),
        );
        words.insert(
            cgu::IDIVB_CTRL.addr(),
            IdivCtrl::new()
                .with_idiv(8)
                .with_clk_sel(ClockSource::Pll1)
                .into_bits(),
        );
        words.insert(
            cgu::BASE_SPIFI_CLK.addr(),
            BaseClk::new().with_clk_sel(ClockSource::Irc).into_bits(),
        );
        words.insert(cgu::XTAL_OSC_CTRL.addr(), 0x0000_0001);
        words.insert(
            rgu::RESET_CTRL1.addr(),
            ResetCtrl1::new().with_m0app_rst(true).into_bits(),
        );

        Self {
            words,
            log: Vec::new(),
            lock_after: Some(polls),
            polls: 0,
        }
    }

    /// PLL1 never reports lock.
    pub fn never_locking() -> Self {
        Self {
            lock_after: None,
            ..Self::with_lock_after(0)
        }
    }

    pub fn word(&self, addr: usize) -> u32 {
        self.words.get(&addr).copied().unwrap_or(0)
    }

    pub fn writes_to(&self, addr: usize) -> Vec<u32> {
        self.log
            .iter()
            .filter_map(|a| match *a {
                Access::Write { addr: a, value } if a == addr => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn reads_of(&self, addr: usize) -> usize {
        self.log
            .iter()
            .filter(|a| matches!(a, Access::Read { addr: a, .. } if *a == addr))
            .count()
    }

    /// Index in the log of the first write of `value` to `addr`.
    pub fn first_write(&self, addr: usize, value: u32) -> Option<usize> {
        self.log
            .iter()
            .position(|a| *a == Access::Write { addr, value })
    }

    /// Index in the log of the first write of any value to `addr`.
    pub fn first_write_to(&self, addr: usize) -> Option<usize> {
        self.log
            .iter()
            .position(|a| matches!(a, Access::Write { addr: a, .. } if *a == addr))
    }

    fn pll1_stat(&mut self) -> u32 {
        let ctrl = Pll1Ctrl::from_bits(self.word(cgu::PLL1_CTRL.addr()));
        let running = !ctrl.pd() && ctrl.clk_sel() == ClockSource::Crystal;
        if !running {
            self.polls = 0;
            return Pll1Stat::new().into_bits();
        }

        let locked = match self.lock_after {
            Some(n) => self.polls >= n,
            None => false,
        };
        self.polls = self.polls.saturating_add(1);
        Pll1Stat::new().with_lock(locked).into_bits()
    }
}

impl RegisterFile for SimRegisters {
    fn read(&mut self, addr: usize) -> u32 {
        let value = if addr == cgu::PLL1_STAT.addr() {
            let stat = self.pll1_stat();
            self.words.insert(addr, stat);
            stat
        } else {
            self.word(addr)
        };
        self.log.push(Access::Read { addr, value });
        value
    }

    fn write(&mut self, addr: usize, value: u32) {
        self.words.insert(addr, value);
        self.log.push(Access::Write { addr, value });
    }
}
