//! Typed clients over the backend, one per portal concern.
//!
//! Each client holds the `Arc<dyn Backend>` it was built with; nothing here
//! reaches for a global connection.

#[macro_use]
mod macros;

pub mod auth_client;
pub mod branding_client;
pub mod order_client;
pub mod pricing_client;
pub mod upload_client;

pub use auth_client::*;
pub use branding_client::*;
pub use order_client::*;
pub use pricing_client::*;
pub use upload_client::*;
