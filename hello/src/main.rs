#![no_std]
#![no_main]

use f103::mmio::Mmio;
use f103::usart::{Config, Usart2};

#[f103::main]
fn main() -> ! {
    let Some(bus) = Mmio::take() else {
        f103::park()
    };
    let mut usart = Usart2::setup(bus, &Config::new());

    let Ok(()) = usart.writer().send_blocking("HELLO WORLD!\n".bytes());

    f103::park()
}

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    f103::park()
}
