use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hint::black_box;
use std::marker::PhantomPinned;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::process;
use std::rc::Rc;
use crate::cfg::{self, SchedulerCfg};
use crate::context::Context;
use crate::coroutine::{Coroutine, CoroutineId, State};
use crate::error::Error;
use crate::local::{self, with_local_scheduler};
use crate::scheduler::shared_stack::SharedStack;
use crate::utils::panic_message;

/// The scheduler works with coroutines. Specifically, it:
///
/// - owns the one stack all of its coroutines run on;
///
/// - stores the coroutines so that they can be resumed later by their [`CoroutineId`];
///
/// - saves the stack of a yielding coroutine into the coroutine's snapshot
/// and puts it back before the coroutine is resumed.
///
/// The scheduler never decides what runs next: the caller resumes coroutines in whatever order it wants.
///
/// The scheduler is pinned, because running and suspended coroutines hold references to it.
/// It is neither [`Send`] nor [`Sync`].
///
/// # Dropping
///
/// A coroutine that is suspended when the scheduler is dropped never finishes.
/// The values living on its stack are leaked.
pub struct Scheduler {
    stack: SharedStack,
    table: RefCell<HashMap<CoroutineId, Rc<Coroutine>>>,
    running: Cell<Option<CoroutineId>>,
    caller: Context,
    next_id: Cell<CoroutineId>,
    _pinned: PhantomPinned
}

impl Scheduler {
    /// Creates a [`Scheduler`] with the config of the current thread (see [`cfg`](crate::cfg)).
    pub fn new() -> Result<Pin<Box<Self>>, Error> {
        Self::with_config(cfg::config())
    }

    /// Creates a [`Scheduler`] with the provided config.
    pub fn with_config(cfg: SchedulerCfg) -> Result<Pin<Box<Self>>, Error> {
        let stack = SharedStack::new(cfg)?;
        Ok(Box::pin(Self {
            stack,
            table: RefCell::new(HashMap::new()),
            running: Cell::new(None),
            caller: Context::new(),
            next_id: Cell::new(CoroutineId::FIRST),
            _pinned: PhantomPinned
        }))
    }

    /// Registers a new coroutine in [`State::Ready`]. Nothing runs until it is [`resumed`](Scheduler::resume).
    ///
    /// `entry` is called with the scheduler on the first resume. Its captures are the coroutine's argument;
    /// state shared with the caller is usually passed as an [`Rc`].
    ///
    /// # Panics
    ///
    /// If the identifier space is exhausted.
    pub fn create<F: FnOnce(&Scheduler) + 'static>(&self, entry: F) -> CoroutineId {
        let id = self.next_id.get();
        self.next_id.set(id.next());
        self.table.borrow_mut().insert(id, Rc::new(Coroutine::new(Box::new(entry))));
        id
    }

    /// Runs the coroutine until it yields or finishes.
    ///
    /// A [`Ready`](State::Ready) coroutine starts its entry on the shared stack.
    /// A [`Suspended`](State::Suspended) coroutine gets its stack image back and continues after its last yield.
    /// If `id` is unknown or the coroutine has finished, nothing happens.
    ///
    /// # Panics
    ///
    /// If it is called from inside a coroutine. Coroutines are resumed only by the caller flow.
    pub fn resume(&self, id: CoroutineId) {
        let coroutine = match self.lookup(id) {
            Some(coroutine) => coroutine,
            None => return
        };

        if let Some(running) = self.running.get() {
            panic!("[FATAL] cannot resume coroutine {} from inside coroutine {}", id, running);
        }

        match coroutine.state() {
            State::Ready => unsafe {
                coroutine.context().prepare(self.stack.base(), self.stack.size(), &self.caller, trampoline);
            },
            State::Suspended => unsafe {
                self.stack.restore(&coroutine.snapshot());
            },
            state => panic!("[FATAL] cannot resume coroutine {} in state {}", id, state)
        }

        self.running.set(Some(id));
        coroutine.set_state(State::Running);

        let _local = local::enter(self);
        unsafe { Context::swap(&self.caller, coroutine.context()) };
    }

    /// Suspends the running coroutine and returns control to the caller of [`resume`](Scheduler::resume).
    ///
    /// The part of the shared stack the coroutine uses is copied into its snapshot first.
    ///
    /// # Panics
    ///
    /// If no coroutine is running.
    pub fn yield_now(&self) {
        let id = match self.running.get() {
            Some(id) => id,
            None => panic!("[FATAL] yield_now is called while no coroutine is running")
        };
        let coroutine = match self.lookup(id) {
            Some(coroutine) => coroutine,
            None => panic!("[BUG] Running coroutine {} is not in the table. Please report this issue.", id)
        };
        // The table keeps the record alive while it is suspended.
        let context: *const Context = coroutine.context();

        self.save_stack(&coroutine);
        coroutine.set_state(State::Suspended);
        drop(coroutine);
        self.running.set(None);

        // Inlined into this frame: everything below the depth measured by `save_stack` is dead here.
        unsafe { Context::swap(&*context, &self.caller) };
    }

    /// Saves the used part of the shared stack into the coroutine's snapshot.
    /// The depth is taken in this frame, so it lies below the frame of the yielding function.
    #[inline(never)]
    fn save_stack(&self, coroutine: &Coroutine) {
        let marker = 0u8;
        let depth = black_box(&marker) as *const u8;
        unsafe { self.stack.save(depth, &mut coroutine.snapshot()) };
    }

    /// Returns the id of the coroutine currently running on the shared stack,
    /// or `None` when control is with the caller.
    pub fn running_id(&self) -> Option<CoroutineId> {
        self.running.get()
    }

    /// Returns the state of the coroutine. Unknown and finished ids are [`Dead`](State::Dead).
    pub fn status(&self, id: CoroutineId) -> State {
        match self.table.borrow().get(&id) {
            Some(coroutine) => coroutine.state(),
            None => State::Dead
        }
    }

    /// Returns the number of coroutines that have not finished yet.
    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the usable size of the shared stack.
    pub fn stack_size(&self) -> usize {
        self.stack.size()
    }

    /// Returns the size of the stack image saved by the last yield of the coroutine.
    pub fn snapshot_size(&self, id: CoroutineId) -> Option<usize> {
        self.lookup(id).map(|coroutine| coroutine.snapshot().len())
    }

    /// Returns how many bytes the coroutine has allocated for its stack image. It never decreases.
    pub fn snapshot_capacity(&self, id: CoroutineId) -> Option<usize> {
        self.lookup(id).map(|coroutine| coroutine.snapshot().cap())
    }

    #[inline(always)]
    fn lookup(&self, id: CoroutineId) -> Option<Rc<Coroutine>> {
        self.table.borrow().get(&id).cloned()
    }

    /// Erases the coroutine that has just returned from its entry.
    fn finish(&self, id: CoroutineId) {
        self.table.borrow_mut().remove(&id);
        self.running.set(None);
    }
}

/// The first function every coroutine runs. It calls the entry, and after the entry returns,
/// removes the coroutine from the table. Returning continues in the caller context.
extern "C" fn trampoline() {
    let finished = with_local_scheduler(|scheduler| {
        let id = match scheduler.running.get() {
            Some(id) => id,
            None => fatal("coroutine started while no coroutine is running")
        };
        let coroutine = match scheduler.lookup(id) {
            Some(coroutine) => coroutine,
            None => fatal("started coroutine is not in the table")
        };

        let entry = coroutine.take_entry();
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| entry(scheduler))) {
            fatal(&format!("coroutine {} panicked: {}", id, panic_message(&*payload)));
        }

        scheduler.finish(id);
        // `resume` still holds the record until it returns to the caller.
        drop(coroutine);
    });

    if finished.is_none() {
        fatal("coroutine started without a local scheduler");
    }
}

/// A panic can not unwind across a context switch, so the process is aborted.
fn fatal(msg: &str) -> ! {
    eprintln!("[FATAL] {}", msg);
    process::abort();
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("stack_size", &self.stack.size())
            .field("coroutines", &self.len())
            .field("running", &self.running.get())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let suspended = self.table.get_mut()
            .values()
            .filter(|coroutine| coroutine.state() == State::Suspended)
            .count();
        if suspended != 0 {
            eprintln!("[WARN] scheduler is dropped with {} suspended coroutines, values on their stacks are leaked", suspended);
        }
    }
}
