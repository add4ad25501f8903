use std::cell::UnsafeCell;
use std::mem;
use crate::utils::check_error;

/// A saved execution context backed by glibc's `ucontext_t`.
///
/// glibc stores pointers into the `ucontext_t` itself (the floating point state on x86_64),
/// so the value lives in a `Box` and never moves after it has been written.
pub(crate) struct Context {
    uc: Box<UnsafeCell<libc::ucontext_t>>
}

impl Context {
    /// Creates an empty context. It becomes meaningful after it is prepared or swapped out of.
    pub(crate) fn new() -> Self {
        Self {
            uc: Box::new(UnsafeCell::new(unsafe { mem::zeroed() }))
        }
    }

    #[inline(always)]
    fn as_ptr(&self) -> *mut libc::ucontext_t {
        self.uc.get()
    }

    /// Makes this context run `entry` on `stack_size` bytes starting at `stack_base`.
    /// When `entry` returns, execution continues in `link`.
    ///
    /// # Safety
    ///
    /// - the stack must be valid for reads and writes while this context runs;
    ///
    /// - `link` must be alive and hold a saved context when `entry` returns;
    ///
    /// - this context must not be running.
    pub(crate) unsafe fn prepare(&self, stack_base: *mut u8, stack_size: usize, link: &Context, entry: extern "C" fn()) {
        let uc = self.as_ptr();
        check_error(libc::getcontext(uc), "cannot initialize a coroutine context", true);
        (*uc).uc_stack.ss_sp = stack_base.cast();
        (*uc).uc_stack.ss_size = stack_size;
        (*uc).uc_stack.ss_flags = 0;
        (*uc).uc_link = link.as_ptr();
        libc::makecontext(uc, entry, 0);
    }

    /// Saves the current execution into `from` and resumes `to`.
    /// Returns when something swaps back into `from`.
    ///
    /// It is always inlined: `swapcontext` keeps nothing on the stack below the caller's frame,
    /// so a stack image taken below the caller's frame stays complete across the switch.
    ///
    /// # Safety
    ///
    /// `to` must have been prepared or saved by a previous swap, and whatever stack it runs on
    /// must hold the same bytes it held when it was saved.
    #[inline(always)]
    pub(crate) unsafe fn swap(from: &Context, to: &Context) {
        check_error(libc::swapcontext(from.as_ptr(), to.as_ptr()), "cannot switch context", true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::ptr;

    thread_local! {
        static MAIN: Cell<*const Context> = const { Cell::new(ptr::null()) };
        static CHILD: Cell<*const Context> = const { Cell::new(ptr::null()) };
        static COUNTER: Cell<usize> = const { Cell::new(0) };
    }

    extern "C" fn count_once() {
        COUNTER.with(|counter| counter.set(counter.get() + 1));
    }

    extern "C" fn ping_pong() {
        for _ in 0..3 {
            COUNTER.with(|counter| counter.set(counter.get() + 10));
            unsafe {
                Context::swap(&*CHILD.with(Cell::get), &*MAIN.with(Cell::get));
            }
        }
    }

    #[test]
    fn test_returns_to_link() {
        let mut stack = vec![0u8; 64 * 1024];
        let main = Context::new();
        let child = Context::new();
        COUNTER.with(|counter| counter.set(0));

        unsafe {
            child.prepare(stack.as_mut_ptr(), stack.len(), &main, count_once);
            Context::swap(&main, &child);
        }

        assert_eq!(COUNTER.with(Cell::get), 1);
    }

    #[test]
    fn test_swap_back_and_forth() {
        let mut stack = vec![0u8; 64 * 1024];
        let main = Context::new();
        let child = Context::new();
        MAIN.with(|cell| cell.set(&main));
        CHILD.with(|cell| cell.set(&child));
        COUNTER.with(|counter| counter.set(0));

        unsafe { child.prepare(stack.as_mut_ptr(), stack.len(), &main, ping_pong) };
        for round in 1..=3 {
            unsafe { Context::swap(&main, &child) };
            assert_eq!(COUNTER.with(Cell::get), round * 10);
        }

        // the last swap lets `ping_pong` return through the link
        unsafe { Context::swap(&main, &child) };
        assert_eq!(COUNTER.with(Cell::get), 30);
    }
}
