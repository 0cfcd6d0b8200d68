use bitflags::bitflags;

use crate::mmio::Register;

/// USART2 block, on APB1.
/// RM0008, section 27.6
pub const BASE: usize = 0x4000_4400;
pub const BLOCK_LEN: usize = 0x400;
/// Status register
/// RM0008, section 27.6.1
pub const SR: Register = Register::at(BASE, 0x00);
/// Data register, only the low 8 (or 9) bits are used
/// RM0008, section 27.6.2
pub const DR: Register = Register::at(BASE, 0x04);
/// Baud rate register
/// RM0008, section 27.6.3
pub const BRR: Register = Register::at(BASE, 0x08);
/// Control register 1
/// RM0008, section 27.6.4
pub const CR1: Register = Register::at(BASE, 0x0C);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u32 {
        /// Read data register not empty.
        const RXNE = 1 << 5;
        /// Transmission complete: the last byte left the shift register.
        const TC = 1 << 6;
        /// Transmit data register empty: `DR` accepts the next byte.
        const TXE = 1 << 7;

        const _ = !0;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control1: u32 {
        /// Receiver enable.
        const RE = 1 << 2;
        /// Transmitter enable.
        const TE = 1 << 3;
        /// USART enable.
        const UE = 1 << 13;

        const _ = !0;
    }
}
