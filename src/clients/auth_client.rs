use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::auth::{AuthError, SignInForm, SignUpForm};
use crate::backend::{find_one, AccessToken, AuthUser, Backend, RowStore, Session};
use crate::domain::Customer;
use crate::table_framework::Query;

/// A new account: its customer row, and the session when the platform
/// confirmed the sign-up immediately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignUpResult {
    pub customer: Customer,
    pub session: Option<Session>,
}

/// Client for account operations.
#[derive(Clone)]
pub struct AuthClient {
    backend: Arc<dyn Backend>,
}

impl_client_new!(AuthClient);

impl AuthClient {
    /// Create the auth user, then the `customers` row keyed by its id.
    ///
    /// The two writes are not atomic: a failed customer insert leaves the auth
    /// user in place and the error is returned as-is.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpResult, AuthError> {
        let credentials = form.validate()?;

        debug!("Sending request");
        let outcome = self.backend.sign_up(&credentials).await.map_err(|e| {
            error!(error = %e, "Sign up failed");
            e
        })?;
        let session = outcome.session.clone();
        let user = outcome.into_user().ok_or_else(|| {
            error!("Sign up returned no user");
            AuthError::NoUserReturned
        })?;

        let customer = Customer::new(
            user.id,
            credentials.email.as_str(),
            form.company_name.trim(),
            form.contact_name.trim(),
        );
        let token = session.as_ref().map(|session| &session.access_token);
        let customer = RowStore::<Customer>::insert(self.backend.as_ref(), token, customer)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %user.id, "Customer insert failed");
                e
            })?;

        info!(customer_id = %customer.id, "Customer registered");
        Ok(SignUpResult { customer, session })
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn sign_in(&self, form: &SignInForm) -> Result<Session, AuthError> {
        let credentials = form.validate()?;
        debug!("Sending request");
        self.backend.sign_in(&credentials).await.map_err(|e| {
            error!(error = %e, "Sign in failed");
            AuthError::from(e)
        })
    }

    #[instrument(skip_all)]
    pub async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        debug!("Sending request");
        Ok(self.backend.sign_out(token).await?)
    }

    #[instrument(skip_all)]
    pub async fn current_user(&self, token: &AccessToken) -> Result<AuthUser, AuthError> {
        debug!("Sending request");
        self.backend.current_user(token).await?.ok_or(AuthError::NotSignedIn)
    }

    #[instrument(skip(self, token, user), fields(user_id = %user.id))]
    pub async fn customer_profile(&self, token: &AccessToken, user: &AuthUser) -> Result<Customer, AuthError> {
        debug!("Sending request");
        find_one::<Customer, _>(self.backend.as_ref(), Some(token), Query::new().eq("id", user.id))
            .await?
            .ok_or(AuthError::ProfileNotFound(user.id))
    }
}
