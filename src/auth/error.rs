use thiserror::Error;
use uuid::Uuid;

use crate::backend::BackendError;

/// Errors that can occur during account operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// Rejected before anything was sent to the identity service.
    #[error("{0}")]
    Validation(String),
    #[error("No user returned from sign up")]
    NoUserReturned,
    #[error("User not logged in")]
    NotSignedIn,
    #[error("Customer profile not found: {0}")]
    ProfileNotFound(Uuid),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
