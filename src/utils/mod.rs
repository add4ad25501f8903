pub mod check_error;
pub mod page;
pub mod panic;

pub use check_error::*;
pub use page::*;
pub use panic::*;
