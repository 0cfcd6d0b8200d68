use crate::{
    gpio::{AlternatePushPull, FloatingInput, Pin, PortA},
    mmio::Bus,
    poll::{Poll, Spin},
    rcc::{Apb1, Apb2, Rcc},
    Sealed,
};

pub mod registers;
mod writer;

use registers::*;
pub use registers::{Control1, Status};
pub use writer::Writer;

/// APB1 clock after reset: the 8 MHz internal oscillator, undivided.
pub const PCLK1: u32 = 8_000_000;

/// USART settings applied when the peripheral is enabled.
///
/// Anything not set here keeps the hardware default: 8 data bits, no parity, 1 stop bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    baud_rate: Option<u32>,
}

impl Config {
    pub const fn new() -> Self {
        Self { baud_rate: None }
    }

    /// Program the baud rate generator for `baud_rate`, assuming the reset clock tree.
    ///
    /// Without this the baud rate register is left as it is, which is what an emulator expects.
    pub const fn baud_rate(mut self, baud_rate: u32) -> Self {
        assert!(
            baud_rate >= 123 && baud_rate <= 500_000,
            "baud rate not in the range 123..=500_000"
        );
        self.baud_rate = Some(baud_rate);
        self
    }

    /// The `BRR` value for the configured baud rate, rounded to the nearest divider.
    fn divider(&self) -> Option<u32> {
        self.baud_rate
            .map(|baud_rate| (PCLK1 + baud_rate / 2) / baud_rate)
    }
}

pub struct Usart2<B, Tx, Rx> {
    bus: B,
    tx_pin: Tx,
    rx_pin: Rx,
}

impl<B: Bus> Usart2<B, Pin<2, AlternatePushPull>, Pin<3, FloatingInput>> {
    /// Bring USART2 up on PA2 (TX) and PA3 (RX), starting from the reset state.
    ///
    /// The port A and alternate function clocks are enabled before the pins are configured, and
    /// the USART2 clock before any USART2 register is touched. All shared registers are updated
    /// with read-modify-write.
    pub fn setup(bus: B, config: &Config) -> Self {
        Rcc::new(&bus).enable_apb2(Apb2::IOPA | Apb2::AFIO);

        let port = PortA::new(&bus);
        let tx_pin = port.pin();
        let rx_pin = port.pin();

        Self::new(bus, tx_pin, rx_pin, config)
    }
}

impl<B: Bus, Tx: TxPin, Rx: RxPin> Usart2<B, Tx, Rx> {
    /// Enable USART2 with already configured pins.
    ///
    /// Pass `()` as the receive pin to leave the receiver off.
    pub fn new(bus: B, tx_pin: Tx, rx_pin: Rx, config: &Config) -> Self {
        Rcc::new(&bus).enable_apb1(Apb1::USART2);

        if let Some(divider) = config.divider() {
            bus.write(BRR, divider);
        }

        let mut enable = Control1::TE;
        if Rx::ENABLED {
            enable |= Control1::RE;
        }
        bus.set_bits(CR1, enable.bits());
        // UE last, so that TE and RE are already set when the peripheral starts.
        bus.set_bits(CR1, Control1::UE.bits());
        debug!("usart2: enabled, cr1 |= {=u32:#x}", (enable | Control1::UE).bits());

        Self {
            bus,
            tx_pin,
            rx_pin,
        }
    }

    /// A blocking writer that spins until the data register is free.
    pub fn writer(&mut self) -> Writer<'_, B, Spin> {
        Writer::new(&self.bus, Spin)
    }

    /// A writer that waits for the data register through `poll`.
    pub fn writer_with<P: Poll>(&mut self, poll: P) -> Writer<'_, B, P> {
        Writer::new(&self.bus, poll)
    }

    pub fn status(&self) -> Status {
        Status::from_bits_retain(self.bus.read(SR))
    }

    /// Turn the USART off and give back the bus and pins.
    ///
    /// A byte still in the shift register is cut short. Flush first to avoid that.
    pub fn disable(self) -> (B, Tx, Rx) {
        let enable = Control1::UE | Control1::TE | Control1::RE;
        self.bus.clear_bits(CR1, enable.bits());
        (self.bus, self.tx_pin, self.rx_pin)
    }
}

/// Trait that represents [`Pin`]s that are valid for use as the USART2 TX pin.
#[allow(private_bounds)]
pub trait TxPin: Sealed {}

/// Trait that represents [`Pin`]s that are valid for use as the USART2 RX pin, or `()` for no
/// receiver.
#[allow(private_bounds)]
pub trait RxPin: Sealed {
    const ENABLED: bool = true;
}

// Default (non-remapped) USART2 pins, RM0008 section 9.3.8.
impl TxPin for Pin<2, AlternatePushPull> {}

impl RxPin for Pin<3, FloatingInput> {}
impl RxPin for () {
    const ENABLED: bool = false;
}
