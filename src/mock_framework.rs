//! # Mock Framework
//!
//! Utilities for testing clients against a scripted backend.
//!
//! Use [`create_mock_backend`] to get a backend and a receiver.
//! Then use helpers like [`expect_insert`] or [`expect_upload`] to assert on
//! each call and answer it.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::backend::{
    AccessToken, AuthApi, AuthUser, BackendError, BackendResult, Credentials, ObjectStorage,
    RowStore, Session, SignUpOutcome, StorageObject,
};
use crate::table_framework::{Query, Record};

pub type Responder<T> = oneshot::Sender<BackendResult<T>>;

/// One call made by the code under test. Rows travel as JSON so a single
/// channel can carry every table.
#[derive(Debug)]
pub enum BackendCall {
    SignUp {
        credentials: Credentials,
        respond_to: Responder<SignUpOutcome>,
    },
    SignIn {
        credentials: Credentials,
        respond_to: Responder<Session>,
    },
    SignOut {
        token: AccessToken,
        respond_to: Responder<()>,
    },
    CurrentUser {
        token: AccessToken,
        respond_to: Responder<Option<AuthUser>>,
    },
    Upload {
        bucket: String,
        path: String,
        content_type: String,
        size: usize,
        respond_to: Responder<()>,
    },
    Insert {
        table: &'static str,
        row: Value,
        respond_to: Responder<Value>,
    },
    Select {
        table: &'static str,
        query: Query,
        respond_to: Responder<Vec<Value>>,
    },
}

/// Backend that forwards every call to the test.
///
/// # Testing Strategy
/// We don't want a live platform (or even the in-memory one) when testing how
/// a client *sequences* its calls. The mock sends each call to a channel the
/// test owns; the test inspects it and answers success or failure, which makes
/// partial failures and transport errors deterministic.
#[derive(Clone)]
pub struct MockBackend {
    sender: mpsc::Sender<BackendCall>,
}

pub fn create_mock_backend(buffer_size: usize) -> (MockBackend, mpsc::Receiver<BackendCall>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (MockBackend { sender }, receiver)
}

impl MockBackend {
    async fn call<T>(&self, build: impl FnOnce(Responder<T>) -> BackendCall) -> BackendResult<T> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| BackendError::Communication("Mock closed".to_string()))?;
        response
            .await
            .map_err(|_| BackendError::Communication("Mock dropped".to_string()))?
    }
}

#[async_trait]
impl AuthApi for MockBackend {
    async fn sign_up(&self, credentials: &Credentials) -> BackendResult<SignUpOutcome> {
        let credentials = credentials.clone();
        self.call(|respond_to| BackendCall::SignUp { credentials, respond_to }).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> BackendResult<Session> {
        let credentials = credentials.clone();
        self.call(|respond_to| BackendCall::SignIn { credentials, respond_to }).await
    }

    async fn sign_out(&self, token: &AccessToken) -> BackendResult<()> {
        let token = token.clone();
        self.call(|respond_to| BackendCall::SignOut { token, respond_to }).await
    }

    async fn current_user(&self, token: &AccessToken) -> BackendResult<Option<AuthUser>> {
        let token = token.clone();
        self.call(|respond_to| BackendCall::CurrentUser { token, respond_to }).await
    }
}

#[async_trait]
impl ObjectStorage for MockBackend {
    async fn upload(&self, _token: &AccessToken, object: StorageObject<'_>) -> BackendResult<()> {
        let bucket = object.bucket.to_string();
        let path = object.path.to_string();
        let content_type = object.content_type.to_string();
        let size = object.bytes.len();
        self.call(|respond_to| BackendCall::Upload { bucket, path, content_type, size, respond_to })
            .await
    }
}

#[async_trait]
impl<T: Record> RowStore<T> for MockBackend {
    async fn insert(&self, _token: Option<&AccessToken>, payload: T::Create) -> BackendResult<T> {
        let row = serde_json::to_value(&payload).map_err(|e| BackendError::Decode(e.to_string()))?;
        let stored = self
            .call(|respond_to| BackendCall::Insert { table: T::TABLE, row, respond_to })
            .await?;
        serde_json::from_value(stored).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn select(&self, _token: Option<&AccessToken>, query: Query) -> BackendResult<Vec<T>> {
        let rows = self
            .call(|respond_to| BackendCall::Select { table: T::TABLE, query, respond_to })
            .await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| BackendError::Decode(e.to_string())))
            .collect()
    }
}

/// Helper to verify that the next call is a sign-up
pub async fn expect_sign_up(receiver: &mut mpsc::Receiver<BackendCall>) -> Option<(Credentials, Responder<SignUpOutcome>)> {
    match receiver.recv().await {
        Some(BackendCall::SignUp { credentials, respond_to }) => Some((credentials, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is a session query
pub async fn expect_current_user(receiver: &mut mpsc::Receiver<BackendCall>) -> Option<(AccessToken, Responder<Option<AuthUser>>)> {
    match receiver.recv().await {
        Some(BackendCall::CurrentUser { token, respond_to }) => Some((token, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is an upload; yields `(bucket, path, size)`
pub async fn expect_upload(receiver: &mut mpsc::Receiver<BackendCall>) -> Option<(String, String, usize, Responder<()>)> {
    match receiver.recv().await {
        Some(BackendCall::Upload { bucket, path, size, respond_to, .. }) => Some((bucket, path, size, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is an insert
pub async fn expect_insert(receiver: &mut mpsc::Receiver<BackendCall>) -> Option<(&'static str, Value, Responder<Value>)> {
    match receiver.recv().await {
        Some(BackendCall::Insert { table, row, respond_to }) => Some((table, row, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next call is a select
pub async fn expect_select(receiver: &mut mpsc::Receiver<BackendCall>) -> Option<(&'static str, Query, Responder<Vec<Value>>)> {
    match receiver.recv().await {
        Some(BackendCall::Select { table, query, respond_to }) => Some((table, query, respond_to)),
        _ => None,
    }
}

/// Echo an insert payload back with the columns the store would generate.
pub fn with_generated_columns(mut row: Value) -> Value {
    row["id"] = serde_json::json!(uuid::Uuid::new_v4());
    row["created_at"] = serde_json::json!(chrono::Utc::now());
    row
}

/// Asserts nothing reached the backend.
pub fn assert_no_calls(receiver: &mut mpsc::Receiver<BackendCall>) {
    if let Ok(call) = receiver.try_recv() {
        panic!("Unexpected backend call: {:?}", call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Customer;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_mock_backend_round_trips_rows() {
        let (backend, mut receiver) = create_mock_backend(10);

        let insert_task = tokio::spawn(async move {
            let customer = Customer::new(Uuid::nil(), "dana@acme.test", "Acme", "Dana");
            RowStore::<Customer>::insert(&backend, None, customer).await
        });

        let (table, row, responder) = expect_insert(&mut receiver).await.expect("Expected Insert call");
        assert_eq!(table, "customers");
        assert_eq!(row["company_name"], "Acme");
        responder.send(Ok(row)).unwrap();

        let stored = insert_task.await.unwrap().unwrap();
        assert_eq!(stored.contact_name, "Dana");
    }
}
