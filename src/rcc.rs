//! Reset and clock control.
//!
//! A peripheral whose clock is gated off ignores every access, without any fault or status to
//! tell software about it. Enable the clock before touching any of its registers.

use bitflags::bitflags;

use crate::mmio::{Bus, Register};

/// RCC block, RM0008 section 7.3.
pub const BASE: usize = 0x4002_1000;
/// APB2 peripheral clock enable register.
pub const APB2ENR: Register = Register::at(BASE, 0x18);
/// APB1 peripheral clock enable register.
pub const APB1ENR: Register = Register::at(BASE, 0x1C);

bitflags! {
    /// Clocks of the high-speed peripheral bus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Apb2: u32 {
        const AFIO = 1 << 0;
        const IOPA = 1 << 2;
    }
}

bitflags! {
    /// Clocks of the low-speed peripheral bus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Apb1: u32 {
        const USART2 = 1 << 17;
    }
}

pub struct Rcc<B> {
    bus: B,
}

impl<B: Bus> Rcc<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Turn on the given APB2 clocks. Clocks that are already on stay on.
    pub fn enable_apb2(&self, clocks: Apb2) {
        trace!("rcc: enable apb2 {=u32:#x}", clocks.bits());
        self.bus.set_bits(APB2ENR, clocks.bits());
    }

    /// Turn on the given APB1 clocks. Clocks that are already on stay on.
    pub fn enable_apb1(&self, clocks: Apb1) {
        trace!("rcc: enable apb1 {=u32:#x}", clocks.bits());
        self.bus.set_bits(APB1ENR, clocks.bits());
    }

    pub fn apb2_enabled(&self) -> Apb2 {
        Apb2::from_bits_retain(self.bus.read(APB2ENR))
    }

    pub fn apb1_enabled(&self) -> Apb1 {
        Apb1::from_bits_retain(self.bus.read(APB1ENR))
    }
}
