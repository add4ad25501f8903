//! Shared-stack stackful coroutines.
//!
//! A [`Scheduler`] owns one fixed-size stack. Every coroutine it creates runs on that stack,
//! and when a coroutine yields, only the bytes it actually used are copied out into a private
//! snapshot. Resuming copies the snapshot back to the same addresses and continues at the
//! point of the yield.
//!
//! # Example
//!
//! ```no_run
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use costack::{Scheduler, State};
//!
//! let scheduler = Scheduler::new().unwrap();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = seen.clone();
//! let id = scheduler.create(move |scheduler| {
//!     for i in 0..3 {
//!         sink.borrow_mut().push(i);
//!         scheduler.yield_now();
//!     }
//! });
//!
//! while scheduler.status(id) != State::Dead {
//!     scheduler.resume(id);
//! }
//! assert_eq!(*seen.borrow(), vec![0, 1, 2]);
//! ```
pub mod cfg;
pub mod coroutine;
pub mod error;
pub mod local;
pub mod scheduler;
pub mod utils;
mod context;

pub use coroutine::{running_id, yield_now, CoroutineId, State};
pub use error::Error;
pub use scheduler::Scheduler;
