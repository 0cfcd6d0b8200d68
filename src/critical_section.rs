use critical_section::{set_impl, Impl, RawRestoreState};
use cortex_m::{interrupt, register::primask};

struct SingleCoreCriticalSection;

// Safety: The implementation upholds the safety invariants of the `acquire` and `release`
// functions. There is a single core, so masking interrupts excludes everything else.
unsafe impl Impl for SingleCoreCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let was_active = primask::read().is_active();
        interrupt::disable();
        was_active
    }

    unsafe fn release(was_active: RawRestoreState) {
        // Only re-enable interrupts if they were enabled before the critical section.
        if was_active {
            // Safety: We are leaving the outermost critical section.
            unsafe { interrupt::enable() };
        }
    }
}

set_impl!(SingleCoreCriticalSection);
