//! Reset vector and startup.
//!
//! After reset the Cortex-M3 loads its stack pointer from the first word of the vector table and
//! jumps to the address in the second word. `link.x` places [`VECTOR_TABLE`] at the start of
//! flash, which the STM32 aliases to address 0 when booting from flash.
//!
//! The reset handler does the least it can: unless the `init-ram` feature is enabled, `.bss` is
//! not zeroed and `.data` is not copied from flash, so statics start out with whatever the RAM
//! held. Programs that rely on initialised statics on real hardware need that feature.

/// Top of the 20 KiB of SRAM. The stack grows down from here.
pub const STACK_TOP: u32 = 0x2000_5000;

/// One vector table slot: a plain value, or the address of a handler.
#[repr(C)]
#[derive(Clone, Copy)]
pub union Vector {
    value: u32,
    handler: unsafe extern "C" fn(),
}

impl Vector {
    pub const fn value(value: u32) -> Self {
        Self { value }
    }

    pub const fn handler(handler: unsafe extern "C" fn()) -> Self {
        Self { handler }
    }
}

/// The two slots the core reads at reset: initial stack pointer, then reset handler.
///
/// Further exceptions and interrupts are not used, so their slots are left out.
#[repr(transparent)]
pub struct VectorTable([Vector; 2]);

impl VectorTable {
    pub const fn new(stack_top: u32, reset: unsafe extern "C" fn()) -> Self {
        Self([Vector::value(stack_top), Vector::handler(reset)])
    }

    pub fn initial_stack_pointer(&self) -> u32 {
        // Safety: `new` always stores a value in the first slot.
        unsafe { self.0[0].value }
    }

    pub fn reset_handler(&self) -> unsafe extern "C" fn() {
        // Safety: `new` always stores a handler in the second slot.
        unsafe { self.0[1].handler }
    }
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
const _: () = assert!(core::mem::size_of::<VectorTable>() == 8);

#[cfg(all(target_arch = "arm", target_os = "none"))]
#[used]
#[unsafe(no_mangle)]
#[unsafe(link_section = ".vector_table")]
pub static VECTOR_TABLE: VectorTable = VectorTable::new(STACK_TOP, reset_handler);

/// The first code that runs after reset.
///
/// Calls the function marked with `#[f103::main]`. With the `park-on-return` feature (on by
/// default) a main that returns ends up in [`park`]. Without it the handler returns to the
/// invalid `EXC_RETURN` value the core put in `lr` at reset, and the core locks up.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn reset_handler() {
    extern "Rust" {
        #[link_name = "_main"]
        fn main();
    }

    #[cfg(feature = "init-ram")]
    // Safety: Nothing has used `.bss` or `.data` yet.
    unsafe { init_ram() };

    // Safety: The main function is defined by the user with the `#[main]` attribute.
    unsafe { main() };

    #[cfg(feature = "park-on-return")]
    park();
}

/// Zero `.bss` and copy the initial values of `.data` from flash.
///
/// # Safety
///
/// Must run before anything reads or writes a static.
#[cfg(all(target_arch = "arm", target_os = "none", feature = "init-ram"))]
unsafe fn init_ram() {
    // Provided by `link.x`, word aligned.
    extern "C" {
        static mut _sbss: u32;
        static mut _ebss: u32;
        static mut _sdata: u32;
        static mut _edata: u32;
        static _sidata: u32;
    }

    // Safety: The linker script guarantees the ranges are valid, aligned and do not overlap.
    unsafe {
        let sbss = &raw mut _sbss;
        let ebss = &raw mut _ebss;
        let sdata = &raw mut _sdata;
        let edata = &raw mut _edata;
        let sidata = &raw const _sidata;

        core::ptr::write_bytes(sbss, 0, ebss.offset_from(sbss) as usize);
        core::ptr::copy_nonoverlapping(sidata, sdata, edata.offset_from(sdata) as usize);
    }
}

/// Idle forever.
pub fn park() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn reset() {}

    #[test]
    fn stack_pointer_comes_first() {
        let table = VectorTable::new(STACK_TOP, reset);
        assert_eq!(table.initial_stack_pointer(), 0x2000_5000);
        assert_eq!(table.reset_handler() as usize, reset as usize);
    }

    #[test]
    fn table_is_two_slots_wide() {
        use core::mem::size_of;

        assert_eq!(size_of::<VectorTable>(), 2 * size_of::<Vector>());
        assert_eq!(size_of::<Vector>(), size_of::<unsafe extern "C" fn()>());
    }

    #[test]
    fn slots_are_in_order() {
        let table = VectorTable::new(0x1234_5678, reset);
        let base = &table as *const VectorTable as usize;
        let first = &table.0[0] as *const Vector as usize;
        let second = &table.0[1] as *const Vector as usize;
        assert_eq!(first, base);
        assert_eq!(second, base + core::mem::size_of::<Vector>());
        // Safety: The first slot holds a value.
        assert_eq!(unsafe { *(first as *const u32) }, 0x1234_5678);
    }

    #[test]
    fn stack_top_is_the_end_of_sram() {
        assert_eq!(STACK_TOP, 0x2000_0000 + 20 * 1024);
    }
}
