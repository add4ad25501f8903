pub mod scheduler;
pub(crate) mod shared_stack;

pub use scheduler::*;
