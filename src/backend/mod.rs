//! Seams to the hosted backend-as-a-service: identity, rows and object storage.
//!
//! Everything above this module talks to an `Arc<dyn Backend>` that is built
//! once at startup and passed in explicitly. [`hosted::HostedBackend`] speaks
//! the platform's REST surface; [`memory::MemoryBackend`] keeps the same
//! contract in process for local runs and tests.

pub mod hosted;
pub mod memory;
pub mod records;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Company, Customer, FileRecord, Order, PricingRule, Profile};
use crate::table_framework::{Query, Record};

/// Errors returned by any backend call.
///
/// `Api` displays the platform's own message untouched so callers can show it
/// to the customer as-is.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Backend communication error: {0}")]
    Communication(String),
}

impl BackendError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        BackendError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Api { status: 401 | 403, .. })
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Bearer token of a signed-in user.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Identity record owned by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: AccessToken,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Result of a sign-up. Depending on the project's confirmation settings the
/// platform answers with a session, a bare user, or both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignUpOutcome {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
}

impl SignUpOutcome {
    /// The new user, taken from the session when no bare user came back.
    pub fn into_user(self) -> Option<AuthUser> {
        self.user.or_else(|| self.session.map(|session| session.user))
    }
}

/// One object to put into storage.
#[derive(Debug, Clone, Copy)]
pub struct StorageObject<'a> {
    pub bucket: &'a str,
    pub path: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

// =============================================================================
// SERVICE TRAITS
// =============================================================================

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> BackendResult<SignUpOutcome>;
    async fn sign_in(&self, credentials: &Credentials) -> BackendResult<Session>;
    async fn sign_out(&self, token: &AccessToken) -> BackendResult<()>;
    /// Resolve a token to its user; `None` when the token is not (or no longer) valid.
    async fn current_user(&self, token: &AccessToken) -> BackendResult<Option<AuthUser>>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store a new object. Existing paths are never overwritten.
    async fn upload(&self, token: &AccessToken, object: StorageObject<'_>) -> BackendResult<()>;
}

#[async_trait]
pub trait RowStore<T: Record>: Send + Sync {
    async fn insert(&self, token: Option<&AccessToken>, payload: T::Create) -> BackendResult<T>;
    async fn select(&self, token: Option<&AccessToken>, query: Query) -> BackendResult<Vec<T>>;
}

/// Everything the portal needs from the platform.
pub trait Backend:
    AuthApi
    + ObjectStorage
    + RowStore<Customer>
    + RowStore<Order>
    + RowStore<PricingRule>
    + RowStore<FileRecord>
    + RowStore<Profile>
    + RowStore<Company>
{
}

impl<B> Backend for B where
    B: AuthApi
        + ObjectStorage
        + RowStore<Customer>
        + RowStore<Order>
        + RowStore<PricingRule>
        + RowStore<FileRecord>
        + RowStore<Profile>
        + RowStore<Company>
{
}

/// First row matching `query`, if any.
pub async fn find_one<T, S>(store: &S, token: Option<&AccessToken>, query: Query) -> BackendResult<Option<T>>
where
    T: Record,
    S: RowStore<T> + ?Sized,
{
    Ok(store.select(token, query.limit(1)).await?.into_iter().next())
}
