//! This module contains a description of [`CoroutineId`] and [`State`].
use std::fmt;

/// The identifier of a coroutine inside its [`Scheduler`](crate::Scheduler).
///
/// Identifiers are issued in strictly increasing order and never reused,
/// even after the coroutine they named has finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoroutineId(u64);

impl CoroutineId {
    pub(crate) const FIRST: Self = Self(0);

    /// Returns the id issued after this one.
    ///
    /// # Panics
    ///
    /// If the identifier space is exhausted.
    pub(crate) fn next(self) -> Self {
        match self.0.checked_add(1) {
            Some(next) => Self(next),
            None => panic!("[FATAL] coroutine identifiers are exhausted")
        }
    }

    /// Returns the raw value of the id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CoroutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The lifecycle state of a coroutine.
///
/// ```text
///            create          resume           yield
///   (none) --------> Ready --------> Running --------> Suspended
///                                     |  ^                 |
///                      entry returns  |  +-----------------+
///                                     v        resume
///                                    Dead
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// Created, never run.
    Ready,
    /// Executing on the shared stack.
    Running,
    /// Yielded. Its stack is saved in a snapshot.
    Suspended,
    /// Finished, or never existed. Terminal.
    Dead
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Ready => "ready",
            State::Running => "running",
            State::Suspended => "suspended",
            State::Dead => "dead"
        };
        f.write_str(name)
    }
}
