//! Account forms and the page gate.

pub mod error;
pub mod forms;
pub mod gate;

pub use error::*;
pub use forms::*;
pub use gate::*;
