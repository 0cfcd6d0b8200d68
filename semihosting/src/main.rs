#![no_std]
#![no_main]

use f103::semihosting::{Breakpoint, Handle, Semihost};

#[f103::main]
fn main() {
    // Safety: This program is meant to run under QEMU with semihosting enabled.
    let mut host = Semihost::new(unsafe { Breakpoint::new() });

    // Nowhere to report a short write.
    let _ = host.write(Handle::STDOUT, b"Hello World!\n");
}

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    f103::park()
}
