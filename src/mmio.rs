//! Access to memory-mapped peripheral registers.
//!
//! Drivers never dereference addresses themselves. They take a [`Bus`] and name registers with
//! [`Register`] constants, so the same driver code runs against the device ([`Mmio`]) and against
//! a recording fake in the host tests.

/// A 32-bit peripheral register, identified by its absolute address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register(usize);

impl Register {
    /// The register `offset` bytes into the peripheral block starting at `base`.
    pub const fn at(base: usize, offset: usize) -> Self {
        Self(base + offset)
    }

    pub const fn address(self) -> usize {
        self.0
    }
}

/// Read and write access to peripheral registers.
///
/// Every call must reach the register: implementations may not cache, merge or drop accesses.
pub trait Bus {
    fn read(&self, register: Register) -> u32;

    fn write(&self, register: Register, value: u32);

    /// Set `bits` in `register`, leaving every other bit as it was.
    fn set_bits(&self, register: Register, bits: u32) {
        let value = self.read(register);
        self.write(register, value | bits);
    }

    /// Clear `bits` in `register`, leaving every other bit as it was.
    fn clear_bits(&self, register: Register, bits: u32) {
        let value = self.read(register);
        self.write(register, value & !bits);
    }

    /// Replace the bits selected by `mask` with `bits`.
    fn modify(&self, register: Register, mask: u32, bits: u32) {
        let value = self.read(register);
        self.write(register, (value & !mask) | (bits & mask));
    }
}

impl<B: Bus + ?Sized> Bus for &B {
    fn read(&self, register: Register) -> u32 {
        (**self).read(register)
    }

    fn write(&self, register: Register, value: u32) {
        (**self).write(register, value)
    }
}

/// The device's own address space.
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Get the device bus, at most once.
    ///
    /// The taken flag lives in `.bss`. On parts that do not clear SRAM at reset, enable the
    /// `init-ram` feature so that it starts out cleared.
    pub fn take() -> Option<Self> {
        use core::cell::Cell;
        use critical_section::Mutex;

        static TAKEN: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

        critical_section::with(|cs| {
            let taken = TAKEN.borrow(cs);
            if taken.get() {
                return None;
            }
            taken.set(true);
            // Safety: The flag guarantees this is the only instance handed out by `take`.
            Some(unsafe { Self::steal() })
        })
    }

    /// Get the device bus without checking whether it was already handed out.
    ///
    /// # Safety
    ///
    /// Only valid on an STM32F103, where the [`Register`]s passed to this bus name real
    /// peripheral registers. Two owners of the bus can leave a peripheral in an inconsistent
    /// state.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl Bus for Mmio {
    fn read(&self, register: Register) -> u32 {
        // Safety: `Mmio` is only used to access registers on the device, where they are valid,
        // aligned addresses.
        unsafe { (register.address() as *const u32).read_volatile() }
    }

    fn write(&self, register: Register, value: u32) {
        // Safety: As above.
        unsafe { (register.address() as *mut u32).write_volatile(value) }
    }
}
