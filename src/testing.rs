//! A recording stand-in for the device bus.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use crate::mmio::{Bus, Register};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read(Register, u32),
    Write(Register, u32),
}

impl Access {
    pub(crate) fn register(&self) -> Register {
        match *self {
            Access::Read(register, _) | Access::Write(register, _) => register,
        }
    }
}

/// Registers are plain memory that reads back what was last written, unless a read script was
/// queued for them, in which case reads consume the script first.
#[derive(Debug, Default)]
pub(crate) struct FakeBus {
    values: RefCell<BTreeMap<Register, u32>>,
    scripted: RefCell<BTreeMap<Register, VecDeque<u32>>>,
    log: RefCell<Vec<Access>>,
}

impl FakeBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set a register without recording an access.
    pub(crate) fn preset(&self, register: Register, value: u32) {
        self.values.borrow_mut().insert(register, value);
    }

    /// Queue values returned by the next reads of `register`.
    pub(crate) fn script(&self, register: Register, reads: impl IntoIterator<Item = u32>) {
        self.scripted
            .borrow_mut()
            .entry(register)
            .or_default()
            .extend(reads);
    }

    pub(crate) fn value(&self, register: Register) -> u32 {
        self.values.borrow().get(&register).copied().unwrap_or(0)
    }

    pub(crate) fn accesses(&self) -> Vec<Access> {
        self.log.borrow().clone()
    }

    pub(crate) fn writes_to(&self, register: Register) -> Vec<u32> {
        self.log
            .borrow()
            .iter()
            .filter_map(|access| match *access {
                Access::Write(r, value) if r == register => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Index of the first access to any register in `base..base + len`.
    pub(crate) fn first_access_in(&self, base: usize, len: usize) -> Option<usize> {
        self.log
            .borrow()
            .iter()
            .position(|access| (base..base + len).contains(&access.register().address()))
    }

    pub(crate) fn position(&self, access: Access) -> Option<usize> {
        self.log.borrow().iter().position(|a| *a == access)
    }
}

impl Bus for FakeBus {
    fn read(&self, register: Register) -> u32 {
        let scripted = self
            .scripted
            .borrow_mut()
            .get_mut(&register)
            .and_then(VecDeque::pop_front);
        let value = scripted.unwrap_or_else(|| self.value(register));
        self.log.borrow_mut().push(Access::Read(register, value));
        value
    }

    fn write(&self, register: Register, value: u32) {
        self.values.borrow_mut().insert(register, value);
        self.log.borrow_mut().push(Access::Write(register, value));
    }
}
