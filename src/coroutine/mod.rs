//! # [`coroutine`]
//!
//! This module contains a description of [`Coroutine`], the record the scheduler keeps for every live coroutine.
//! This module is used for low-level work with the scheduler.
//!
//! # [`snapshot`]
//! This module contains [`StackSnapshot`], the private buffer a suspended coroutine keeps its stack in.
//!
//! # [`state`]
//! This module contains [`CoroutineId`] and [`State`].
//!
//! # [`yielding`]
//! This module contains functions for the high-level working with the scheduler. For example, [`yield_now`].

pub(crate) mod coroutine;
pub mod snapshot;
pub mod state;
pub mod yielding;

pub(crate) use coroutine::*;
pub use snapshot::*;
pub use state::*;
pub use yielding::*;
