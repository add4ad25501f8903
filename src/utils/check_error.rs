//! Result checks for the libc calls behind the shared stack and the context switch.

use std::io;
use libc::c_int;

/// Checks the result of `getcontext`, `swapcontext` or `munmap`. All of them return `-1` and set `errno` on failure.
///
/// A failed context call leaves the coroutine in an unknown place, so it is checked with `is_fatal`
/// and panics with `[FATAL]`. A failed `munmap` while the shared stack is dropped only leaks the mapping,
/// so it prints an `[ERROR]` line and execution goes on.
///
/// ```ignore
/// check_error(unsafe { libc::swapcontext(from, to) }, "cannot switch context", true);
/// check_error(unsafe { libc::munmap(mapping, len) }, "cannot unmap the shared stack", false);
/// ```
#[inline(always)]
pub fn check_error(res: c_int, msg: &str, is_fatal: bool) {
    if res < 0 {
        if is_fatal {
            panic!("[FATAL] {}: {}", msg, io::Error::last_os_error());
        } else {
            eprintln!("[ERROR] {}: {}", msg, io::Error::last_os_error());
        }
    }
}
