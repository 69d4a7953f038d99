use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur while quoting a job.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    #[error("Quantity is required")]
    MissingQuantity,
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid pricing rule for {product_type} on {paper_type}: {reason}")]
    InvalidRule {
        product_type: String,
        paper_type: String,
        reason: String,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
}
