//! Order submission and history errors.

pub mod error;

pub use error::*;
