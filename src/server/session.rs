use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::app_system::PortalSystem;
use crate::auth::AuthDecision;
use crate::backend::{AccessToken, AuthUser};

/// The signed-in caller of a protected route, placed in request extensions
/// by [`require_session`].
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user: AuthUser,
    pub token: AccessToken,
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<AccessToken> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(AccessToken::new(token))
}

/// Gate middleware: anonymous callers are redirected to the login page and
/// never reach the handler.
pub async fn require_session(
    State(system): State<PortalSystem>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers());
    match (system.gate.check(token.as_ref()).await, token) {
        (AuthDecision::Render(user), Some(token)) => {
            request.extensions_mut().insert(Viewer { user, token });
            next.run(request).await
        }
        (AuthDecision::Redirect(path), _) => {
            debug!(path = %request.uri().path(), "Redirecting anonymous visitor");
            Redirect::to(&path).into_response()
        }
        (AuthDecision::Render(_), None) => Redirect::to(system.gate.login_path()).into_response(),
    }
}
