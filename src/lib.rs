//! Hardware abstractions over the STM32F103 microcontroller.

// Register accesses go through a `mmio::Bus`. On the device that is `mmio::Mmio`, which issues
// volatile loads and stores; the Cortex-M3 treats the peripheral region as Device memory, so
// accesses reach the peripherals in program order and no barriers are needed between them.
#![cfg_attr(not(test), no_std)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![deny(unsafe_op_in_unsafe_fn)]

// This must come first so the logging macros are visible to the other modules.
mod fmt;

pub mod boot;
#[cfg(all(target_arch = "arm", target_os = "none"))]
mod critical_section;
pub mod gpio;
pub mod mmio;
pub mod poll;
pub mod rcc;
pub mod semihosting;
pub mod usart;

#[cfg(test)]
mod testing;

pub use boot::park;
pub use macros::main;

use embedded_hal_nb as hal_nb;
use embedded_io as eio;

trait Sealed {}

impl Sealed for () {}

macro_rules! impl_sealed {
    ($($t:ty),*) => {
        $(
            impl Sealed for $t {}
        )*
    };
}
pub(crate) use impl_sealed;
