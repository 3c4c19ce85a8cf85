//! Word-sized register access.
//!
//! Every hardware access the bootstrap makes goes through a [`RegisterFile`]: [`Mmio`] on
//! target, a recording simulator in tests. The typed [`Reg`] handles generated from
//! `data/lpc43xx/registers.yaml` (see [`crate::pac`]) turn raw words into the field structs
//! in [`crate::cgu`], [`crate::scu`], [`crate::spifi`] and [`crate::m0app`].

use core::marker::PhantomData;

#[cfg(test)]
pub(crate) mod sim;

/// A flat, word-addressed register space.
pub trait RegisterFile {
    /// Read the 32-bit word at `addr`.
    fn read(&mut self, addr: usize) -> u32;

    /// Write `value` to the 32-bit word at `addr`.
    fn write(&mut self, addr: usize, value: u32);
}

impl<R: RegisterFile + ?Sized> RegisterFile for &mut R {
    #[inline(always)]
    fn read(&mut self, addr: usize) -> u32 {
        (**self).read(addr)
    }

    #[inline(always)]
    fn write(&mut self, addr: usize, value: u32) {
        (**self).write(addr, value)
    }
}

/// The real memory-mapped peripherals.
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Take the peripheral address space.
    ///
    /// # Safety
    ///
    /// Only one `Mmio` may be live, and nothing else may touch the SCU, SPIFI, CGU, CREG or
    /// RGU registers while it is. Addresses passed to it must be valid LPC43xx registers.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl RegisterFile for Mmio {
    #[inline(always)]
    fn read(&mut self, addr: usize) -> u32 {
        // SAFETY: `steal` guarantees `addr` is a register we own.
        unsafe { core::ptr::read_volatile(addr as *const u32) }
    }

    #[inline(always)]
    fn write(&mut self, addr: usize, value: u32) {
        // SAFETY: `steal` guarantees `addr` is a register we own.
        unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
    }
}

/// A register at a fixed address whose contents decode as `T`.
pub struct Reg<T> {
    addr: usize,
    _word: PhantomData<fn() -> T>,
}

impl<T> Clone for Reg<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Reg<T> {}

impl<T> PartialEq for Reg<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T> Eq for Reg<T> {}

impl<T> core::fmt::Debug for Reg<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Reg({:#010x})", self.addr)
    }
}

#[cfg(feature = "defmt")]
impl<T> defmt::Format for Reg<T> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Reg({=usize:#010x})", self.addr)
    }
}

impl<T> Reg<T> {
    pub const fn from_addr(addr: usize) -> Self {
        Self {
            addr,
            _word: PhantomData,
        }
    }

    pub const fn addr(&self) -> usize {
        self.addr
    }
}

impl<T: Copy + Default + From<u32> + Into<u32>> Reg<T> {
    #[inline(always)]
    pub fn read(&self, regs: &mut impl RegisterFile) -> T {
        T::from(regs.read(self.addr))
    }

    #[inline(always)]
    pub fn write_value(&self, regs: &mut impl RegisterFile, value: T) {
        regs.write(self.addr, value.into())
    }

    /// Write a word built from `T::default()` (all fields clear).
    #[inline(always)]
    pub fn write<R>(&self, regs: &mut impl RegisterFile, f: impl FnOnce(&mut T) -> R) -> R {
        let mut value = T::default();
        let res = f(&mut value);
        self.write_value(regs, value);
        res
    }

    /// Read, change, write back.
    #[inline(always)]
    pub fn modify<R>(&self, regs: &mut impl RegisterFile, f: impl FnOnce(&mut T) -> R) -> R {
        let mut value = self.read(regs);
        let res = f(&mut value);
        self.write_value(regs, value);
        res
    }
}
