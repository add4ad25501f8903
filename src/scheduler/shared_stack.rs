//! The single stack every coroutine of a [`Scheduler`](crate::Scheduler) runs on.
//!
//! All stack address arithmetic lives here.
use std::io;
use std::ptr;
use crate::cfg::{SchedulerCfg, MIN_STACK_SIZE};
use crate::coroutine::StackSnapshot;
use crate::error::Error;
use crate::utils::{check_error, page_size, round_to_page};

/// An anonymous mapping used as a stack. It grows down from [`top`](SharedStack::top).
///
/// ```text
/// low                                                        high
/// +------------+------------------------------+----------------+
/// | guard page |           free               |   in use       |
/// +------------+------------------------------+----------------+
///              ^                              ^                ^
///             base                          depth             top
/// ```
///
/// The guard page is mapped without access rights, so running off the bottom of the stack faults.
pub(crate) struct SharedStack {
    mapping: *mut libc::c_void,
    mapping_len: usize,
    base: *mut u8,
    size: usize
}

impl SharedStack {
    /// Maps a new stack according to `cfg`.
    pub(crate) fn new(cfg: SchedulerCfg) -> Result<Self, Error> {
        if cfg.stack_size() < MIN_STACK_SIZE {
            return Err(Error::StackTooSmall { size: cfg.stack_size(), min: MIN_STACK_SIZE });
        }

        let too_large = || Error::StackTooLarge { size: cfg.stack_size() };
        let size = round_to_page(cfg.stack_size()).ok_or_else(too_large)?;
        let guard = if cfg.guard_page() { page_size() } else { 0 };
        let mapping_len = size.checked_add(guard).ok_or_else(too_large)?;

        let mapping = unsafe {
            libc::mmap(
                ptr::null_mut(),
                mapping_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_STACK,
                -1,
                0
            )
        };
        if mapping == libc::MAP_FAILED {
            return Err(Error::MapStack(io::Error::last_os_error()));
        }

        if guard != 0 && unsafe { libc::mprotect(mapping, guard, libc::PROT_NONE) } != 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::munmap(mapping, mapping_len) };
            return Err(Error::GuardPage(err));
        }

        Ok(Self {
            mapping,
            mapping_len,
            base: unsafe { mapping.cast::<u8>().add(guard) },
            size
        })
    }

    /// Returns the lowest usable address.
    #[inline(always)]
    pub(crate) fn base(&self) -> *mut u8 {
        self.base
    }

    /// Returns the usable size in bytes.
    #[inline(always)]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    fn top(&self) -> usize {
        self.base as usize + self.size
    }

    /// Returns how many bytes are in use when the stack pointer is at `depth`.
    ///
    /// # Panics
    ///
    /// If `depth` is not inside the stack, which means the stack overflowed
    /// or the caller is not running on this stack.
    pub(crate) fn used_at(&self, depth: *const u8) -> usize {
        let depth = depth as usize;
        let top = self.top();
        if depth < self.base as usize || depth > top {
            panic!(
                "[FATAL] stack depth {:#x} is outside of the shared stack {:#x}..{:#x} (stack overflow?)",
                depth, self.base as usize, top
            );
        }

        top - depth
    }

    /// Copies everything between `depth` and the top of the stack into `snapshot`.
    ///
    /// # Safety
    ///
    /// The bytes between `depth` and the top must not be written while they are copied.
    pub(crate) unsafe fn save(&self, depth: *const u8, snapshot: &mut StackSnapshot) {
        let used = self.used_at(depth);
        let image = snapshot.prepare(used);
        ptr::copy_nonoverlapping((self.top() - used) as *const u8, image.as_mut_ptr(), used);
    }

    /// Copies `snapshot` back to the top of the stack, at the addresses it was saved from.
    ///
    /// # Safety
    ///
    /// Nothing may be executing on this stack.
    pub(crate) unsafe fn restore(&self, snapshot: &StackSnapshot) {
        let image = snapshot.as_ref();
        debug_assert!(image.len() <= self.size);
        ptr::copy_nonoverlapping(image.as_ptr(), (self.top() - image.len()) as *mut u8, image.len());
    }
}

impl Drop for SharedStack {
    fn drop(&mut self) {
        check_error(unsafe { libc::munmap(self.mapping, self.mapping_len) }, "cannot unmap the shared stack", false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(size: usize) -> SharedStack {
        SharedStack::new(SchedulerCfg::default().with_stack_size(size)).unwrap()
    }

    #[test]
    fn test_rounds_to_page() {
        let stack = stack(MIN_STACK_SIZE + 1);
        assert_eq!(Some(stack.size()), round_to_page(MIN_STACK_SIZE + 1));
        assert_eq!(stack.base() as usize % page_size(), 0);
    }

    #[test]
    fn test_too_small() {
        let res = SharedStack::new(SchedulerCfg::default().with_stack_size(MIN_STACK_SIZE - 1));
        assert!(matches!(res, Err(Error::StackTooSmall { min: MIN_STACK_SIZE, .. })));
    }

    #[test]
    fn test_too_large() {
        let size = usize::MAX - 100;
        let res = SharedStack::new(SchedulerCfg::default().with_stack_size(size));
        assert!(matches!(res, Err(Error::StackTooLarge { size: s }) if s == size));

        let res = SharedStack::new(SchedulerCfg::default().with_stack_size(size).with_guard_page(false));
        assert!(matches!(res, Err(Error::StackTooLarge { .. })));

        // rounds without overflow, but the guard page does not fit
        let size = usize::MAX - page_size() + 1;
        let res = SharedStack::new(SchedulerCfg::default().with_stack_size(size));
        assert!(matches!(res, Err(Error::StackTooLarge { .. })));
    }

    #[test]
    fn test_without_guard_page() {
        let stack = SharedStack::new(SchedulerCfg::default().with_guard_page(false)).unwrap();
        assert_eq!(stack.base() as *mut libc::c_void, stack.mapping);
        assert_eq!(stack.size(), 1024 * 1024);
    }

    #[test]
    fn test_used_at() {
        let stack = stack(MIN_STACK_SIZE);
        let top = unsafe { stack.base().add(stack.size()) };
        assert_eq!(stack.used_at(top), 0);
        assert_eq!(stack.used_at(unsafe { top.sub(100) }), 100);
        assert_eq!(stack.used_at(stack.base()), stack.size());
    }

    #[test]
    #[should_panic(expected = "outside of the shared stack")]
    fn test_used_at_overflow() {
        let stack = stack(MIN_STACK_SIZE);
        let below = (stack.base() as usize - 1) as *const u8;
        stack.used_at(below);
    }

    #[test]
    fn test_save_and_restore() {
        let stack = stack(MIN_STACK_SIZE);
        let used = 256;
        let depth = unsafe { stack.base().add(stack.size() - used) };
        for i in 0..used {
            unsafe { depth.add(i).write(i as u8) };
        }

        let mut snapshot = StackSnapshot::new();
        unsafe { stack.save(depth, &mut snapshot) };
        assert_eq!(snapshot.len(), used);

        unsafe { ptr::write_bytes(depth, 0xAA, used) };
        unsafe { stack.restore(&snapshot) };

        for i in 0..used {
            assert_eq!(unsafe { depth.add(i).read() }, i as u8);
        }
    }
}
