//! Storage naming and upload errors.

pub mod error;
pub mod naming;

pub use error::*;
pub use naming::*;
