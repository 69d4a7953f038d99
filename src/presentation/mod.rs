//! Page state and rendering. No I/O happens here.

pub mod dashboard;
pub mod wizard;

pub use dashboard::*;
pub use wizard::*;
