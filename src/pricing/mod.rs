//! Quote arithmetic. Pure functions; the rule lookup lives in
//! [`crate::clients::PricingClient`].

pub mod calculator;
pub mod error;

pub use calculator::*;
pub use error::*;
