use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::AuthError;
use crate::backend::{AccessToken, AuthUser, Backend};
use crate::clients::AuthClient;

pub const DEFAULT_LOGIN_PATH: &str = "/auth";

/// Who is visiting a protected page.
#[derive(Debug, Clone, PartialEq)]
pub enum Visitor {
    Authenticated(AuthUser),
    Anonymous,
}

/// Gate state for one page visit: the session query is either still running
/// or has resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Checking,
    Resolved(Visitor),
}

/// What the page should do.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthDecision {
    Render(AuthUser),
    Redirect(String),
}

impl GateState {
    /// `None` while checking: nothing protected may render yet.
    pub fn decision(&self, login_path: &str) -> Option<AuthDecision> {
        match self {
            GateState::Checking => None,
            GateState::Resolved(Visitor::Authenticated(user)) => Some(AuthDecision::Render(user.clone())),
            GateState::Resolved(Visitor::Anonymous) => Some(AuthDecision::Redirect(login_path.to_string())),
        }
    }

    /// Settle a pending check with the outcome of the session query. A
    /// resolved state never changes.
    pub fn settle(self, lookup: Result<AuthUser, AuthError>) -> GateState {
        if let GateState::Resolved(_) = self {
            return self;
        }
        match lookup {
            Ok(user) => GateState::Resolved(Visitor::Authenticated(user)),
            Err(AuthError::NotSignedIn) => {
                debug!("Session not recognised");
                GateState::Resolved(Visitor::Anonymous)
            }
            Err(e) => {
                warn!(error = %e, "Session check failed");
                GateState::Resolved(Visitor::Anonymous)
            }
        }
    }
}

/// Guard in front of every protected page.
///
/// One session query per visit, no retry: a failed query counts as anonymous.
#[derive(Clone)]
pub struct AuthGate {
    auth: AuthClient,
    login_path: String,
}

impl AuthGate {
    pub fn new(backend: Arc<dyn Backend>, login_path: impl Into<String>) -> Self {
        Self {
            auth: AuthClient::new(backend),
            login_path: login_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[instrument(skip_all, fields(has_token = token.is_some()))]
    pub async fn resolve(&self, token: Option<&AccessToken>) -> GateState {
        let state = GateState::Checking;
        let Some(token) = token else {
            debug!("No session token");
            return state.settle(Err(AuthError::NotSignedIn));
        };
        state.settle(self.auth.current_user(token).await)
    }

    pub async fn check(&self, token: Option<&AccessToken>) -> AuthDecision {
        let state = self.resolve(token).await;
        state
            .decision(&self.login_path)
            .unwrap_or_else(|| AuthDecision::Redirect(self.login_path.clone()))
    }
}
