use std::cell::Cell;

/// The smallest shared stack a [`Scheduler`](crate::Scheduler) accepts.
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// The default shared stack size (1 MiB).
pub const DEFAULT_STACK_SIZE: usize = 1024 * 1024;

/// Configuration of a [`Scheduler`](crate::Scheduler).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SchedulerCfg {
    stack_size: usize,
    guard_page: bool
}

impl SchedulerCfg {
    pub const fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            guard_page: true
        }
    }

    /// Sets the capacity of the shared stack in bytes. It is rounded up to the page size.
    pub const fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    /// Sets whether an inaccessible page is mapped below the shared stack,
    /// so that a stack overflow faults instead of corrupting adjacent memory.
    pub const fn with_guard_page(mut self, guard_page: bool) -> Self {
        self.guard_page = guard_page;
        self
    }

    pub const fn stack_size(&self) -> usize {
        self.stack_size
    }

    pub const fn guard_page(&self) -> bool {
        self.guard_page
    }
}

thread_local! {
    /// The config used by [`Scheduler::new`](crate::Scheduler::new) on this thread.
    static SCHEDULER_CFG: Cell<SchedulerCfg> = const { Cell::new(SchedulerCfg::default()) };
}

pub fn config() -> SchedulerCfg {
    SCHEDULER_CFG.with(|cfg| cfg.get())
}

pub fn config_stack_size() -> usize {
    config().stack_size
}

pub fn config_guard_page() -> bool {
    config().guard_page
}

pub fn set_stack_size(stack_size: usize) {
    set_config(config().with_stack_size(stack_size));
}

pub fn set_guard_page(guard_page: bool) {
    set_config(config().with_guard_page(guard_page));
}

pub fn set_config(config: SchedulerCfg) {
    SCHEDULER_CFG.with(|cfg| cfg.set(config));
}
