pub mod customer;
pub mod order;
pub mod pricing_rule;
pub mod quote;
pub mod file;
pub mod company;

pub use customer::*;
pub use order::*;
pub use pricing_rule::*;
pub use quote::*;
pub use file::*;
pub use company::*;
