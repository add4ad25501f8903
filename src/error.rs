//! Errors returned while setting up a [`Scheduler`](crate::Scheduler).
//!
//! The steady-state create/resume/yield protocol has no error path: misuse is fatal.
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("shared stack of {size} bytes is smaller than the minimum of {min} bytes")]
    StackTooSmall { size: usize, min: usize },

    #[error("shared stack of {size} bytes is too large to be mapped")]
    StackTooLarge { size: usize },

    #[error("cannot map the shared stack: {0}")]
    MapStack(#[source] io::Error),

    #[error("cannot protect the guard page of the shared stack: {0}")]
    GuardPage(#[source] io::Error),
}
