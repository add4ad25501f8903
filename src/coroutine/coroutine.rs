//! This module contains a description of [`Coroutine`], the record behind a [`CoroutineId`](crate::CoroutineId).
use std::cell::{Cell, RefCell, RefMut};
use crate::context::Context;
use crate::coroutine::{StackSnapshot, State};
use crate::Scheduler;

/// The user work of a coroutine. Its captures play the role of the coroutine argument.
pub(crate) type Entry = Box<dyn FnOnce(&Scheduler)>;

/// A coroutine record. It is shared (by [`Rc`](std::rc::Rc)) between the scheduler table
/// and whoever executes on its behalf, so it outlives its table entry
/// until the code running for it has unwound.
pub(crate) struct Coroutine {
    context: Context,
    snapshot: RefCell<StackSnapshot>,
    state: Cell<State>,
    entry: Cell<Option<Entry>>
}

impl Coroutine {
    pub(crate) fn new(entry: Entry) -> Self {
        Self {
            context: Context::new(),
            snapshot: RefCell::new(StackSnapshot::new()),
            state: Cell::new(State::Ready),
            entry: Cell::new(Some(entry))
        }
    }

    #[inline(always)]
    pub(crate) fn state(&self) -> State {
        self.state.get()
    }

    #[inline(always)]
    pub(crate) fn set_state(&self, state: State) {
        self.state.set(state);
    }

    #[inline(always)]
    pub(crate) fn context(&self) -> &Context {
        &self.context
    }

    pub(crate) fn snapshot(&self) -> RefMut<'_, StackSnapshot> {
        self.snapshot.borrow_mut()
    }

    /// Takes the entry out of the record.
    ///
    /// # Panics
    ///
    /// If the entry has already been taken, that is, the coroutine has been started twice.
    pub(crate) fn take_entry(&self) -> Entry {
        match self.entry.take() {
            Some(entry) => entry,
            None => panic!("[BUG] Coroutine started twice. Please report this issue.")
        }
    }
}
