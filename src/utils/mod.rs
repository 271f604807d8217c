pub mod bits;
pub mod consts;
pub mod logging;

pub use bits::*;
