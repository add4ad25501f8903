use std::cell::Cell;
use std::ptr;
use crate::Scheduler;

thread_local! {
    /// The [`Scheduler`] that is driving a coroutine on the current thread, or null.
    /// It is set for the duration of [`Scheduler::resume`].
    ///
    /// This is thread-local, so it can be used without synchronization.
    static LOCAL_SCHEDULER: Cell<*const Scheduler> = const { Cell::new(ptr::null()) };
}

/// Restores the previous local scheduler on drop.
pub(crate) struct Entered {
    previous: *const Scheduler
}

/// Makes `scheduler` the local scheduler until the returned guard is dropped.
pub(crate) fn enter(scheduler: &Scheduler) -> Entered {
    let previous = LOCAL_SCHEDULER.with(|local| local.replace(scheduler));
    Entered { previous }
}

impl Drop for Entered {
    fn drop(&mut self) {
        LOCAL_SCHEDULER.with(|local| local.set(self.previous));
    }
}

/// Calls `f` with the [`Scheduler`] that is resuming a coroutine on this thread.
///
/// Returns `None` when called outside any coroutine.
pub fn with_local_scheduler<R>(f: impl FnOnce(&Scheduler) -> R) -> Option<R> {
    let scheduler = LOCAL_SCHEDULER.with(Cell::get);
    if scheduler.is_null() {
        return None;
    }

    // The pointer was set by a `resume` call that is still on the caller's stack,
    // and the scheduler is pinned.
    Some(f(unsafe { &*scheduler }))
}

/// Returns `true` if this thread is executing a coroutine.
pub fn in_coroutine() -> bool {
    !LOCAL_SCHEDULER.with(Cell::get).is_null()
}
