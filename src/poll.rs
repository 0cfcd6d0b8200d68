//! Busy-wait primitives.
//!
//! Every wait for a hardware flag goes through [`Poll::wait_until`]. The device uses [`Spin`],
//! which never gives up. [`Bounded`] stops after a fixed number of checks, which is what a test
//! harness or a caller that wants a timeout needs.

use core::convert::Infallible;

/// Wait until a condition holds.
pub trait Poll {
    type Error;

    /// Call `ready` until it returns `true`.
    ///
    /// Returns as soon as `ready` has returned `true`, and never calls it again after that.
    fn wait_until(&mut self, ready: impl FnMut() -> bool) -> Result<(), Self::Error>;
}

impl<P: Poll + ?Sized> Poll for &mut P {
    type Error = P::Error;

    fn wait_until(&mut self, ready: impl FnMut() -> bool) -> Result<(), Self::Error> {
        (**self).wait_until(ready)
    }
}

/// Spin forever until the condition holds.
///
/// If the condition never holds, for example because the peripheral clock is off, this never
/// returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spin;

impl Poll for Spin {
    type Error = Infallible;

    fn wait_until(&mut self, mut ready: impl FnMut() -> bool) -> Result<(), Infallible> {
        while !ready() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

/// Give up after `max_checks` unsuccessful checks in a single wait.
#[derive(Debug, Clone, Copy)]
pub struct Bounded {
    max_checks: usize,
    checks: usize,
}

impl Bounded {
    pub const fn new(max_checks: usize) -> Self {
        Self {
            max_checks,
            checks: 0,
        }
    }

    /// Total number of times the condition was checked, over every wait.
    pub fn checks(&self) -> usize {
        self.checks
    }
}

impl Poll for Bounded {
    type Error = Exhausted;

    fn wait_until(&mut self, mut ready: impl FnMut() -> bool) -> Result<(), Exhausted> {
        for _ in 0..self.max_checks {
            self.checks += 1;
            if ready() {
                return Ok(());
            }
        }
        Err(Exhausted {
            checks: self.max_checks,
        })
    }
}

/// A [`Bounded`] wait ran out of checks before the condition held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Exhausted {
    pub checks: usize,
}

impl core::fmt::Display for Exhausted {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "condition not met after {} checks", self.checks)
    }
}

impl core::error::Error for Exhausted {}

impl crate::eio::Error for Exhausted {
    fn kind(&self) -> crate::eio::ErrorKind {
        crate::eio::ErrorKind::TimedOut
    }
}
