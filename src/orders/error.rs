use thiserror::Error;

use crate::backend::BackendError;
use crate::pricing::PricingError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
