use core::convert::Infallible;

use crate::{eio, hal_nb, mmio::Bus, poll::Poll};

use super::registers::*;

/// The transmit half of USART2.
///
/// Every wait for the peripheral goes through the poller `P`.
pub struct Writer<'a, B, P> {
    bus: &'a B,
    poll: P,
}

impl<'a, B: Bus, P: Poll> Writer<'a, B, P> {
    pub(super) fn new(bus: &'a B, poll: P) -> Self {
        Self { bus, poll }
    }

    fn status(&self) -> Status {
        Status::from_bits_retain(self.bus.read(SR))
    }

    /// Send `items` one at a time, in order.
    ///
    /// Before each item the status register is polled until `TXE` is set, then the item is
    /// written to the data register. Only the low 8 bits of an item are sent, the rest is
    /// dropped. Returns once the last item has been accepted by the data register, which is
    /// before it has left the wire.
    ///
    /// With [`crate::poll::Spin`] this never fails, but it never returns either if `TXE` never
    /// sets, for example when the USART2 clock is off.
    pub fn send_blocking<T: Into<u32>>(
        &mut self,
        items: impl IntoIterator<Item = T>,
    ) -> Result<(), P::Error> {
        let bus = self.bus;
        for item in items {
            self.poll.wait_until(|| {
                Status::from_bits_retain(bus.read(SR)).contains(Status::TXE)
            })?;
            bus.write(DR, item.into() & 0xFF);
        }
        Ok(())
    }

    /// Wait until the last byte written has been shifted out.
    pub fn flush_blocking(&mut self) -> Result<(), P::Error> {
        let bus = self.bus;
        self.poll
            .wait_until(|| Status::from_bits_retain(bus.read(SR)).contains(Status::TC))
    }
}

impl<B: Bus, P: Poll> eio::ErrorType for Writer<'_, B, P>
where
    P::Error: eio::Error,
{
    type Error = P::Error;
}

impl<B: Bus, P: Poll> eio::Write for Writer<'_, B, P>
where
    P::Error: eio::Error,
{
    /// Waits for room for the first byte, then keeps writing for as long as the data register
    /// is free without waiting again.
    fn write(&mut self, buf: &[u8]) -> Result<usize, P::Error> {
        let Some((first, rest)) = buf.split_first() else {
            return Ok(0);
        };
        self.send_blocking([*first])?;

        let mut written = 1;
        for byte in rest {
            if !self.status().contains(Status::TXE) {
                break;
            }
            self.bus.write(DR, *byte as u32);
            written += 1;
        }
        Ok(written)
    }

    fn flush(&mut self) -> Result<(), P::Error> {
        self.flush_blocking()
    }
}

impl<B: Bus, P> hal_nb::serial::ErrorType for Writer<'_, B, P> {
    type Error = Infallible;
}

impl<B: Bus, P> hal_nb::serial::Write for Writer<'_, B, P> {
    fn write(&mut self, word: u8) -> hal_nb::nb::Result<(), Infallible> {
        let status = Status::from_bits_retain(self.bus.read(SR));
        if !status.contains(Status::TXE) {
            return Err(hal_nb::nb::Error::WouldBlock);
        }
        self.bus.write(DR, word as u32);
        Ok(())
    }

    fn flush(&mut self) -> hal_nb::nb::Result<(), Infallible> {
        let status = Status::from_bits_retain(self.bus.read(SR));
        if !status.contains(Status::TC) {
            return Err(hal_nb::nb::Error::WouldBlock);
        }
        Ok(())
    }
}

impl<B: Bus, P: Poll> core::fmt::Write for Writer<'_, B, P> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.send_blocking(s.bytes()).map_err(|_| core::fmt::Error)
    }
}
