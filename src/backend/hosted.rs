use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{
    AccessToken, AuthApi, AuthUser, BackendError, BackendResult, Credentials, ObjectStorage,
    RowStore, Session, SignUpOutcome, StorageObject,
};
use crate::table_framework::{Query, Record};

/// Backend speaking the hosted platform's REST surface.
///
/// Every request carries the project's anon key as `apikey`; the bearer is the
/// caller's access token when there is one, the anon key otherwise, so row
/// level security sees the right user.
#[derive(Clone)]
pub struct HostedBackend {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl HostedBackend {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    fn request(&self, method: Method, path: &str, token: Option<&AccessToken>) -> RequestBuilder {
        let bearer = token.map(AccessToken::as_str).unwrap_or(&self.anon_key);
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, request: RequestBuilder) -> BackendResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await)
        }
    }

    async fn send_json(&self, request: RequestBuilder) -> BackendResult<Value> {
        self.send(request)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

async fn api_error(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("Request failed").to_string()
        } else {
            body
        }
    });
    warn!(status = status.as_u16(), message = %message, "Backend rejected request");
    BackendError::api(status.as_u16(), message)
}

/// The platform's services name their error message differently.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> BackendResult<T> {
    serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Sign-up answers with a session (auto-confirmed projects) or a bare user.
fn parse_sign_up(value: Value) -> BackendResult<SignUpOutcome> {
    if value.get("access_token").is_some() {
        let session: Session = decode(value)?;
        return Ok(SignUpOutcome {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }
    let user = if let Some(user) = value.get("user").filter(|user| user.is_object()) {
        Some(decode::<AuthUser>(user.clone())?)
    } else if value.get("id").is_some() {
        Some(decode::<AuthUser>(value)?)
    } else {
        None
    };
    Ok(SignUpOutcome { user, session: None })
}

#[async_trait]
impl AuthApi for HostedBackend {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_up(&self, credentials: &Credentials) -> BackendResult<SignUpOutcome> {
        debug!("Sending request");
        let request = self.request(Method::POST, "/auth/v1/signup", None).json(credentials);
        parse_sign_up(self.send_json(request).await?)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_in(&self, credentials: &Credentials) -> BackendResult<Session> {
        debug!("Sending request");
        let request = self
            .request(Method::POST, "/auth/v1/token?grant_type=password", None)
            .json(credentials);
        decode(self.send_json(request).await?)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, token: &AccessToken) -> BackendResult<()> {
        debug!("Sending request");
        self.send(self.request(Method::POST, "/auth/v1/logout", Some(token)))
            .await
            .map(|_| ())
    }

    #[instrument(skip_all)]
    async fn current_user(&self, token: &AccessToken) -> BackendResult<Option<AuthUser>> {
        debug!("Sending request");
        match self.send_json(self.request(Method::GET, "/auth/v1/user", Some(token))).await {
            Ok(value) => decode(value).map(Some),
            Err(e) if e.is_unauthorized() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ObjectStorage for HostedBackend {
    #[instrument(skip(self, token, object), fields(bucket = object.bucket, path = object.path, size = object.bytes.len()))]
    async fn upload(&self, token: &AccessToken, object: StorageObject<'_>) -> BackendResult<()> {
        debug!("Sending request");
        let path = format!("/storage/v1/object/{}/{}", object.bucket, object.path);
        let request = self
            .request(Method::POST, &path, Some(token))
            .header(header::CONTENT_TYPE, object.content_type)
            .header(header::CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(object.bytes.to_vec());
        self.send(request).await.map(|_| ())
    }
}

#[async_trait]
impl<T: Record> RowStore<T> for HostedBackend {
    #[instrument(skip(self, token, payload), fields(table = T::TABLE))]
    async fn insert(&self, token: Option<&AccessToken>, payload: T::Create) -> BackendResult<T> {
        debug!("Sending request");
        let request = self
            .request(Method::POST, &format!("/rest/v1/{}", T::TABLE), token)
            .header("Prefer", "return=representation")
            .json(&payload);
        let rows: Vec<T> = decode(self.send_json(request).await?)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode(format!("insert into {} returned no rows", T::TABLE)))
    }

    #[instrument(skip(self, token), fields(table = T::TABLE))]
    async fn select(&self, token: Option<&AccessToken>, query: Query) -> BackendResult<Vec<T>> {
        debug!("Sending request");
        let request = self
            .request(Method::GET, &format!("/rest/v1/{}", T::TABLE), token)
            .query(&query.to_params());
        decode(self.send_json(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_message_prefers_platform_fields() {
        assert_eq!(
            extract_message(r#"{"code":400,"msg":"User already registered"}"#),
            Some("User already registered".to_string())
        );
        assert_eq!(
            extract_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            Some("Invalid login credentials".to_string())
        );
        assert_eq!(
            extract_message(r#"{"message":"new row violates row-level security policy"}"#),
            Some("new row violates row-level security policy".to_string())
        );
        assert_eq!(extract_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_sign_up_with_session_takes_user_from_session() {
        let id = uuid::Uuid::new_v4();
        let outcome = parse_sign_up(json!({
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "ref",
            "user": { "id": id, "email": "a@b.co" }
        }))
        .unwrap();
        assert!(outcome.session.is_some());
        assert_eq!(outcome.into_user().map(|u| u.id), Some(id));
    }

    #[test]
    fn test_sign_up_awaiting_confirmation_returns_bare_user() {
        let id = uuid::Uuid::new_v4();
        let outcome = parse_sign_up(json!({ "id": id, "email": "a@b.co", "aud": "authenticated" })).unwrap();
        assert!(outcome.session.is_none());
        assert_eq!(outcome.user.map(|u| u.id), Some(id));
    }

    #[test]
    fn test_sign_up_without_user_yields_nothing() {
        let outcome = parse_sign_up(json!({})).unwrap();
        assert_eq!(outcome.into_user(), None);
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let backend = HostedBackend::new("https://project.example.co/", "anon");
        assert_eq!(backend.base_url, "https://project.example.co");
    }
}
