use core::marker::PhantomData;

use crate::{
    impl_sealed,
    mmio::{Bus, Register},
    Sealed,
};

/// Port configuration register low, pins 0-7.
const CRL: usize = 0x00;
/// Port configuration register high, pins 8-15.
const CRH: usize = 0x04;

/// GPIO port A, home of the USART2 pins.
pub struct PortA<B> {
    bus: B,
}

impl<B: Bus> PortA<B> {
    /// GPIOA block.
    /// RM0008, section 9.5
    pub const BASE: usize = 0x4001_0800;

    /// The `IOPAEN` clock in [`crate::rcc::APB2ENR`] must be on before any pin is configured.
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    /// The configuration register that holds pin `N`, and the shift of its 4-bit field.
    pub const fn config_field<const N: u8>() -> (Register, u32) {
        const { assert!(N < 16, "invalid pin number, only pins 0-15 are valid.") };
        let offset = if N < 8 { CRL } else { CRH };
        (Register::at(Self::BASE, offset), (N as u32 % 8) * 4)
    }

    /// Put pin `N` in mode `T`.
    ///
    /// Only the pin's own MODE and CNF bits are rewritten. The other seven pins sharing the
    /// configuration register keep their configuration.
    pub fn pin<const N: u8, T: PinType>(&self) -> Pin<N, T> {
        let (register, shift) = Self::config_field::<N>();
        self.bus.modify(register, 0b1111 << shift, T::CONFIG_BITS << shift);

        Pin { _mode: PhantomData }
    }
}

/// A configured port A pin. Holding one is proof that the pin is in mode `T`.
pub struct Pin<const N: u8, T> {
    _mode: PhantomData<T>,
}

impl<const N: u8, T> Sealed for Pin<N, T> {}

/// Floating input, the reset state of every pin.
pub struct FloatingInput;
/// Alternate function push-pull output, 50 MHz. Hands the pin to a peripheral such as a USART.
pub struct AlternatePushPull;

#[allow(private_bounds)]
pub trait PinType: Sealed {
    /// `CNF[1:0]` and `MODE[1:0]` of the pin, as they appear in its 4-bit field.
    const CONFIG_BITS: u32;
}

impl_sealed!(FloatingInput, AlternatePushPull);

impl PinType for FloatingInput {
    const CONFIG_BITS: u32 = 0b0100;
}
impl PinType for AlternatePushPull {
    const CONFIG_BITS: u32 = 0b1011;
}
