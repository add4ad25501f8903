//! Saving, preparing and switching CPU execution contexts.
//!
//! This is the only place that touches the platform's context primitives. The contract is narrow:
//!
//! - [`Context::prepare`] makes a context that will run a function on a given stack
//!   and continue with another context when the function returns;
//!
//! - [`Context::swap`] saves the current execution into one context and resumes another.
cfg_if::cfg_if! {
    if #[cfg(all(target_os = "linux", target_env = "gnu"))] {
        mod ucontext;
        pub(crate) use ucontext::Context;
    } else {
        compile_error!("costack supports only linux with glibc (getcontext/makecontext/swapcontext)");
    }
}
