//! This module contains functions for the high-level working with the scheduler. For example, [`yield_now`].
//!
//! They act on the [`Scheduler`] currently driving the thread, so code deep inside a coroutine
//! does not need the scheduler passed down to it.
use crate::coroutine::CoroutineId;
use crate::local::with_local_scheduler;
use crate::Scheduler;

/// Suspends the running coroutine and returns control to the caller of [`Scheduler::resume`].
///
/// # Example
///
/// ```no_run
/// use costack::{yield_now, Scheduler};
///
/// fn step(name: &str) {
///     println!("{name}");
///     yield_now(); // let the caller resume other coroutines.
/// }
///
/// let scheduler = Scheduler::new().unwrap();
/// let id = scheduler.create(|_| {
///     step("first");
///     step("second");
/// });
/// scheduler.resume(id);
/// scheduler.resume(id);
/// ```
///
/// # Panics
///
/// If no coroutine is running on this thread.
pub fn yield_now() {
    if with_local_scheduler(Scheduler::yield_now).is_none() {
        panic!("[FATAL] yield_now is called outside of any coroutine");
    }
}

/// Returns the id of the coroutine running on this thread, or `None` outside any coroutine.
pub fn running_id() -> Option<CoroutineId> {
    with_local_scheduler(Scheduler::running_id).flatten()
}
