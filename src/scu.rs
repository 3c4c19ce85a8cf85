//! System control unit: pin function and electrical configuration.

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

use bitfield_struct::bitfield;

use crate::regs::Reg;

/// SFSPm_n: configuration of one normal-drive pin.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct PinConfig {
    /// [2:0] MODE: function select
    #[bits(3)]
    pub function: u8,
    /// [3] EPD: enable pull-down
    pub pull_down: bool,
    /// [4] EPUN: 1 disables the pull-up
    pub pull_up_disable: bool,
    /// [5] EHS: fast slew rate
    pub fast_slew: bool,
    /// [6] EZI: enable input buffer
    pub input_buffer: bool,
    /// [7] ZIF: 1 bypasses the input glitch filter
    pub glitch_filter_disable: bool,
    #[bits(24)]
    __: u32,
}

impl PinConfig {
    /// `function` with no pulls, fast slew, input buffer on and glitch filter off: the setting
    /// for signals clocked above 30 MHz.
    pub const fn high_speed(function: u8) -> Self {
        Self::new()
            .with_function(function)
            .with_pull_down(false)
            .with_pull_up_disable(true)
            .with_fast_slew(true)
            .with_input_buffer(true)
            .with_glitch_filter_disable(true)
    }
}

/// A package pin and its SCU configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    /// Package name, `P<port>_<pin>`.
    pub name: &'static str,
    /// Signal routed to the pin.
    pub signal: &'static str,
    pub reg: Reg<PinConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_speed_word() {
        assert_eq!(PinConfig::high_speed(3).into_bits(), 0xF3);
        assert_eq!(PinConfig::high_speed(0).into_bits(), 0xF0);
    }

    #[test]
    fn spifi_pin_addresses() {
        let addrs: [usize; 6] = core::array::from_fn(|i| crate::pac::SPIFI_PINS[i].reg.addr());
        assert_eq!(
            addrs,
            [0x4008_618C, 0x4008_6190, 0x4008_6194, 0x4008_6198, 0x4008_619C, 0x4008_61A0]
        );
        assert_eq!(crate::pac::SPIFI_PINS[0].name, "P3_3");
        assert_eq!(crate::pac::SPIFI_PINS[5].signal, "SPIFI_CS");
        assert_eq!(crate::pac::SPIFI_PIN_FUNCTION, 3);
    }
}
