//! Host I/O through an attached debugger or emulator.
//!
//! A semihosting request puts an operation number in `r0` and a parameter (usually the address
//! of a parameter block) in `r1`, then executes `bkpt 0xAB`. The debugger stops the core, carries
//! out the request on the host, puts the result in `r0` and resumes the core.
//!
//! Nothing answers the breakpoint on a standalone board: the core takes a HardFault (or locks up
//! if no handler is installed). Only use this under a debugger or under QEMU with
//! `-semihosting-config enable=on`.

use core::ffi::CStr;

/// Semihosting operation numbers.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Write one character to the debug console.
    WriteC = 0x03,
    /// Write a NUL-terminated string to the debug console.
    Write0 = 0x04,
    /// Write a buffer to an open host file handle.
    Write = 0x05,
    /// Report that the application finished.
    Exit = 0x18,
}

/// `ADP_Stopped_ApplicationExit`, the reason reported by [`Semihost::exit`].
pub const APPLICATION_EXIT: usize = 0x20026;

/// A host file handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Handle(pub usize);

impl Handle {
    pub const STDOUT: Handle = Handle(1);
    pub const STDERR: Handle = Handle(2);
}

/// Consecutive words pointed to by `r1`, laid out exactly as the host reads them.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamBlock<const N: usize>(pub [usize; N]);

impl<const N: usize> ParamBlock<N> {
    pub fn as_ptr(&self) -> *const usize {
        self.0.as_ptr()
    }
}

/// The instruction that hands a request to the host.
pub trait Trap {
    /// Issue `op` with `param` in `r1`, and return what the host left in `r0`.
    ///
    /// # Safety
    ///
    /// `param` must be what `op` expects. When it is an address, the memory behind it must stay
    /// valid and unchanged until this returns.
    unsafe fn call(&mut self, op: Operation, param: usize) -> usize;
}

impl<T: Trap + ?Sized> Trap for &mut T {
    unsafe fn call(&mut self, op: Operation, param: usize) -> usize {
        // Safety: Forwarded, the caller upholds the contract.
        unsafe { (**self).call(op, param) }
    }
}

/// `bkpt 0xAB`, the Thumb semihosting trap.
#[derive(Debug)]
pub struct Breakpoint {
    _private: (),
}

impl Breakpoint {
    /// # Safety
    ///
    /// A debugger or emulator with semihosting enabled must be attached for as long as this is
    /// used. Otherwise the breakpoint faults.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(target_arch = "arm")]
impl Trap for Breakpoint {
    unsafe fn call(&mut self, op: Operation, param: usize) -> usize {
        let result: usize;
        // Safety: The semihosting request is defined in the ARM semihosting specification,
        // section 2.3. The host may read and write memory through `param`, so no memory options
        // are given. A host is attached, as required by `Breakpoint::new`.
        unsafe {
            core::arch::asm!(
                "bkpt 0xAB",
                inout("r0") op as usize => result,
                in("r1") param,
                options(nostack, preserves_flags),
            );
        }
        result
    }
}

/// Semihosting requests, issued through `T`.
pub struct Semihost<T> {
    trap: T,
}

impl<T: Trap> Semihost<T> {
    pub const fn new(trap: T) -> Self {
        Self { trap }
    }

    /// Issue `op` with a parameter block, and return the host's result code unchanged.
    pub fn call<const N: usize>(&mut self, op: Operation, block: &ParamBlock<N>) -> usize {
        trace!("semihosting: op {=u32:#x}, {=usize} words", op as u32, N);
        // Safety: `block` is borrowed for the whole call, so it is valid and unchanged.
        unsafe { self.trap.call(op, block.as_ptr() as usize) }
    }

    /// `SYS_WRITE`: write `bytes` to `handle`.
    ///
    /// The parameter block is `[handle, buffer address, length]`.
    pub fn write(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), Unwritten> {
        let block = ParamBlock([handle.0, bytes.as_ptr() as usize, bytes.len()]);
        match self.call(Operation::Write, &block) {
            0 => Ok(()),
            remaining => Err(Unwritten(remaining)),
        }
    }

    /// `SYS_WRITEC`: write one character to the debug console.
    pub fn write_c(&mut self, byte: u8) {
        // Safety: The parameter is the address of the character, borrowed for the call.
        unsafe { self.trap.call(Operation::WriteC, &byte as *const u8 as usize) };
    }

    /// `SYS_WRITE0`: write a NUL-terminated string to the debug console.
    pub fn write0(&mut self, s: &CStr) {
        // Safety: The parameter is the address of the string, borrowed for the call.
        unsafe { self.trap.call(Operation::Write0, s.as_ptr() as usize) };
    }

    /// `SYS_EXIT`: tell the host the application is done.
    ///
    /// QEMU exits when it receives this. Under a debugger that lets the core run on, this parks.
    pub fn exit(&mut self) -> ! {
        // Safety: On AArch32 the parameter is the reason code itself, not an address.
        unsafe { self.trap.call(Operation::Exit, APPLICATION_EXIT) };
        crate::park()
    }

    /// A [`core::fmt::Write`] adapter on the host's standard output.
    pub fn stdout(&mut self) -> HostStream<'_, T> {
        HostStream {
            host: self,
            handle: Handle::STDOUT,
        }
    }

    pub fn stderr(&mut self) -> HostStream<'_, T> {
        HostStream {
            host: self,
            handle: Handle::STDERR,
        }
    }
}

pub struct HostStream<'a, T> {
    host: &'a mut Semihost<T>,
    handle: Handle,
}

impl<T: Trap> core::fmt::Write for HostStream<'_, T> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.host
            .write(self.handle, s.as_bytes())
            .map_err(|_| core::fmt::Error)
    }
}

/// The host did not write everything; holds the number of bytes left over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Unwritten(pub usize);

impl core::fmt::Display for Unwritten {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "host left {} bytes unwritten", self.0)
    }
}

impl core::error::Error for Unwritten {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Request {
        op: Operation,
        param: usize,
        /// The first three words behind `param`, for requests that take a block.
        block: Option<[usize; 3]>,
        /// The bytes a buffer or string request pointed at.
        data: Vec<u8>,
    }

    /// Decodes every request the way a host would, and answers with queued results.
    #[derive(Default)]
    struct Recorder {
        requests: Vec<Request>,
        results: Vec<usize>,
    }

    impl Trap for Recorder {
        unsafe fn call(&mut self, op: Operation, param: usize) -> usize {
            let (block, data) = match op {
                Operation::Write => {
                    // Safety: `Write` takes a three word block, valid for the call.
                    let block = unsafe { *(param as *const [usize; 3]) };
                    // Safety: The block describes a live buffer.
                    let data =
                        unsafe { core::slice::from_raw_parts(block[1] as *const u8, block[2]) };
                    (Some(block), data.to_vec())
                }
                // Safety: `WriteC` points at one byte.
                Operation::WriteC => (None, vec![unsafe { *(param as *const u8) }]),
                Operation::Write0 => {
                    // Safety: `Write0` points at a NUL-terminated string.
                    let s = unsafe { CStr::from_ptr(param as *const core::ffi::c_char) };
                    (None, s.to_bytes().to_vec())
                }
                Operation::Exit => (None, Vec::new()),
            };
            self.requests.push(Request {
                op,
                param,
                block,
                data,
            });
            if self.results.is_empty() {
                0
            } else {
                self.results.remove(0)
            }
        }
    }

    #[test]
    fn operation_numbers() {
        assert_eq!(Operation::WriteC as u32, 0x03);
        assert_eq!(Operation::Write0 as u32, 0x04);
        assert_eq!(Operation::Write as u32, 0x05);
        assert_eq!(Operation::Exit as u32, 0x18);
    }

    #[test]
    fn write_builds_handle_address_length() {
        let message = b"Hello World!\n";
        let mut recorder = Recorder::default();
        let result = Semihost::new(&mut recorder).write(Handle::STDOUT, message);

        assert_eq!(result, Ok(()));
        assert_eq!(recorder.requests.len(), 1);
        let request = &recorder.requests[0];
        assert_eq!(request.op, Operation::Write);
        assert_eq!(
            request.block,
            Some([1, message.as_ptr() as usize, message.len()])
        );
        assert_eq!(request.data, message);
    }

    #[test]
    fn write_reports_unwritten_bytes() {
        let mut recorder = Recorder {
            results: vec![4],
            ..Default::default()
        };
        let result = Semihost::new(&mut recorder).write(Handle::STDERR, b"partial");

        assert_eq!(result, Err(Unwritten(4)));
        assert_eq!(recorder.requests[0].block.unwrap()[0], 2);
    }

    #[test]
    fn call_passes_the_operation_and_result_through() {
        let mut recorder = Recorder {
            results: vec![0xDEAD],
            ..Default::default()
        };
        let bytes = [0u8; 2];
        let block = ParamBlock([7, bytes.as_ptr() as usize, 2]);
        let result = Semihost::new(&mut recorder).call(Operation::Write, &block);

        assert_eq!(result, 0xDEAD);
        assert_eq!(recorder.requests[0].op, Operation::Write);
        assert_eq!(recorder.requests[0].param, block.as_ptr() as usize);
        assert_eq!(recorder.requests[0].block, Some(block.0));
    }

    #[test]
    fn one_trap_per_request() {
        let mut recorder = Recorder::default();
        let mut host = Semihost::new(&mut recorder);
        host.write_c(b'!');
        host.write0(c"zero");
        let _ = host.write(Handle::STDOUT, b"");
        drop(host);

        let ops: Vec<_> = recorder.requests.iter().map(|r| r.op).collect();
        assert_eq!(ops, [Operation::WriteC, Operation::Write0, Operation::Write]);
        assert_eq!(recorder.requests[0].data, b"!");
        assert_eq!(recorder.requests[1].data, b"zero");
    }

    #[test]
    fn stdout_formats_through_write() {
        use core::fmt::Write;

        let mut recorder = Recorder::default();
        let mut host = Semihost::new(&mut recorder);
        write!(host.stdout(), "{} + {}", 1, 2).unwrap();
        drop(host);

        let written: Vec<u8> = recorder
            .requests
            .iter()
            .inspect(|r| assert_eq!(r.block.unwrap()[0], 1))
            .flat_map(|r| r.data.iter().copied())
            .collect();
        assert_eq!(written, b"1 + 2");
    }

    #[test]
    fn stdout_reports_a_short_write() {
        use core::fmt::Write;

        let mut recorder = Recorder {
            results: vec![1],
            ..Default::default()
        };
        let mut host = Semihost::new(&mut recorder);
        assert!(host.stdout().write_str("ab").is_err());
    }
}
