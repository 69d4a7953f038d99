//! System configuration, wiring, and the HTTP error mapping.

pub mod config;
pub mod error;
pub mod portal_system;
pub mod tracing;

pub use config::*;
pub use error::*;
pub use portal_system::*;
pub use self::tracing::*;
