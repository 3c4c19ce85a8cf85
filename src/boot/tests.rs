extern crate std;

use std::vec::Vec;

use super::*;
use crate::cgu::{ClockSource, Pll1Ctrl, Pll1Stat};
use crate::m0app::ResetCtrl1;
use crate::pac::{self, cgu, creg, rgu};
use crate::regs::sim::{Access, SimRegisters};
use crate::time::mhz;

fn run_to_release(regs: SimRegisters) -> Bootstrap<SimRegisters> {
    let mut boot = Bootstrap::new(regs, Config::new());
    boot.run();
    assert_eq!(boot.stage(), Stage::Released);
    boot
}

#[test]
fn stage_order() {
    let mut boot = Bootstrap::new(SimRegisters::with_lock_after(1), Config::new());
    assert_eq!(boot.stage(), Stage::Reset);

    let mut stages = Vec::new();
    while boot.stage() != Stage::Released {
        stages.push(boot.step());
    }

    assert_eq!(
        stages,
        [
            Stage::InterfaceConfigured,
            Stage::Clock(ClockState::Precondition),
            Stage::Clock(ClockState::Settle1),
            Stage::Clock(ClockState::PllConfiguring),
            Stage::Clock(ClockState::PllLockWait),
            Stage::Clock(ClockState::PllLockWait),
            Stage::Clock(ClockState::PllLockedDivided),
            Stage::Clock(ClockState::Settle2),
            Stage::Clock(ClockState::PllDirect),
            Stage::InterfaceFast,
            Stage::Released,
        ]
    );

    // Terminal.
    let len = boot.regs().log.len();
    assert_eq!(boot.step(), Stage::Released);
    assert_eq!(boot.regs().log.len(), len);
}

#[test]
fn end_to_end() {
    let mut boot = run_to_release(SimRegisters::after_boot_rom());
    let config = *boot.config();
    let regs = boot.regs_mut();

    let pll1 = Pll1Ctrl::from_bits(regs.word(cgu::PLL1_CTRL.addr()));
    assert!(!pll1.pd());
    assert!(pll1.direct());
    assert_eq!(pll1.clk_sel(), ClockSource::Crystal);
    assert_eq!(pll1.m(), 17);
    assert!(Pll1Stat::from_bits(regs.word(cgu::PLL1_STAT.addr())).lock());

    assert_eq!(regs.word(cgu::BASE_M4_CLK.addr()), 0x0900_0800);
    assert_eq!(regs.word(cgu::IDIVB_CTRL.addr()), 0x0900_0804);
    assert_eq!(regs.word(cgu::BASE_SPIFI_CLK.addr()), 0x0D00_0800);
    assert_eq!(regs.word(pac::spifi::CTRL.addr()), 0x6001_FFFF);
    assert_eq!(regs.word(creg::M0APPMEMMAP.addr()), 0x1404_0000);
    assert_eq!(
        regs.word(creg::M0APPMEMMAP.addr()),
        pac::memory::SPIFI_DATA_CACHED_BASE as u32 + 0x4_0000
    );
    assert!(!ResetCtrl1::from_bits(regs.word(rgu::RESET_CTRL1.addr())).m0app_rst());

    let clocks = rcc::read_clocks(regs, config.xtal);
    assert_eq!(clocks.m4, Some(mhz(204)));
    assert_eq!(clocks.spifi, Some(mhz(102)));
}

#[test]
fn last_lock_poll_saw_lock() {
    let boot = run_to_release(SimRegisters::with_lock_after(4));
    let last = boot
        .regs()
        .log
        .iter()
        .rev()
        .find_map(|a| match *a {
            Access::Read { addr, value } if addr == cgu::PLL1_STAT.addr() => Some(value),
            _ => None,
        });
    assert_eq!(last, Some(1));
}

#[test]
fn pins_identical() {
    let boot = run_to_release(SimRegisters::after_boot_rom());
    let regs = boot.regs();

    let words: Vec<Vec<u32>> = pac::SPIFI_PINS
        .iter()
        .map(|pin| regs.writes_to(pin.reg.addr()))
        .collect();
    assert_eq!(words.len(), 6);
    for w in &words {
        assert_eq!(w, &words[0]);
        assert_eq!(w.len(), 1);
    }
}

#[test]
fn spifi_never_rising_edge_with_feedback() {
    let boot = run_to_release(SimRegisters::after_boot_rom());
    for value in boot.regs().writes_to(pac::spifi::CTRL.addr()) {
        let ctrl = crate::spifi::SpifiCtrl::from_bits(value);
        assert!(ctrl.rfclk() || !ctrl.fbclk());
    }
}

#[test]
fn phase_order() {
    let boot = run_to_release(SimRegisters::after_boot_rom());
    let regs = boot.regs();

    let pins = pac::SPIFI_PINS
        .iter()
        .filter_map(|pin| regs.first_write_to(pin.reg.addr()))
        .max()
        .unwrap();
    let ctrl = regs.first_write_to(pac::spifi::CTRL.addr()).unwrap();
    let xtal = regs.first_write_to(cgu::XTAL_OSC_CTRL.addr()).unwrap();
    let pll = regs.first_write_to(cgu::PLL1_CTRL.addr()).unwrap();
    let direct = regs.first_write(cgu::PLL1_CTRL.addr(), 0x0610_0880).unwrap();
    let idivb = regs.first_write_to(cgu::IDIVB_CTRL.addr()).unwrap();
    let spifi_clk = regs.first_write_to(cgu::BASE_SPIFI_CLK.addr()).unwrap();
    let remap = regs.first_write_to(creg::M0APPMEMMAP.addr()).unwrap();
    let release = regs.first_write_to(rgu::RESET_CTRL1.addr()).unwrap();

    assert!(pins < ctrl);
    assert!(ctrl < xtal);
    assert!(xtal < pll);
    assert!(pll < direct);
    assert!(direct < idivb);
    assert!(idivb < spifi_clk);
    assert!(spifi_clk < remap);
    assert!(remap < release);
}

#[test]
fn remap_observed_before_release() {
    let boot = run_to_release(SimRegisters::after_boot_rom());
    let regs = boot.regs();
    let remap_addr = creg::M0APPMEMMAP.addr();

    let release = regs.first_write_to(rgu::RESET_CTRL1.addr()).unwrap();
    let readback = regs
        .log
        .iter()
        .position(|a| {
            *a == Access::Read {
                addr: remap_addr,
                value: 0x1404_0000,
            }
        })
        .unwrap();
    assert!(regs.first_write(remap_addr, 0x1404_0000).unwrap() < readback);
    assert!(readback < release);

    // Nothing touches the remap register after release.
    assert!(regs.log[release..].iter().all(|a| a.addr() != remap_addr));
    assert_eq!(regs.writes_to(rgu::RESET_CTRL1.addr()), [0]);
}

#[test]
fn no_lock_no_handoff() {
    let mut boot = Bootstrap::new(SimRegisters::never_locking(), Config::new());
    for _ in 0..10_000 {
        boot.step();
    }

    assert_eq!(boot.stage(), Stage::Clock(ClockState::PllLockWait));
    let regs = boot.regs();
    assert!(regs.writes_to(creg::M0APPMEMMAP.addr()).is_empty());
    assert!(regs.writes_to(rgu::RESET_CTRL1.addr()).is_empty());
    assert!(regs.writes_to(cgu::IDIVB_CTRL.addr()).is_empty());
    assert_eq!(regs.first_write(cgu::PLL1_CTRL.addr(), 0x0610_0880), None);
    assert_eq!(regs.first_write(cgu::BASE_M4_CLK.addr(), 0x0900_0800), None);
}

#[test]
fn system_init_is_a_no_op() {
    crate::system_init();
    crate::system_init();
}

#[test]
#[cfg(not(any(feature = "defmt", feature = "log")))]
fn fast_interface_step_only_writes_without_logging() {
    let mut boot = Bootstrap::new(SimRegisters::with_lock_after(1), Config::new());
    while boot.stage() != Stage::Clock(ClockState::PllDirect) {
        boot.step();
    }

    let before = boot.regs().log.len();
    assert_eq!(boot.step(), Stage::InterfaceFast);
    assert_eq!(
        boot.regs().log[before..],
        [
            Access::Write {
                addr: cgu::IDIVB_CTRL.addr(),
                value: 0x0900_0804
            },
            Access::Write {
                addr: cgu::BASE_SPIFI_CLK.addr(),
                value: 0x0D00_0800
            },
        ]
    );
}
