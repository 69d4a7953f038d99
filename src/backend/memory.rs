use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{
    AccessToken, AuthApi, AuthUser, BackendError, BackendResult, Credentials, ObjectStorage,
    RowStore, Session, SignUpOutcome, StorageObject,
};
use crate::domain::{Company, Customer, FileRecord, Order, PricingRule, Profile};
use crate::table_framework::{Query, Record, TableActor, TableClient};

const MIN_PASSWORD_LEN: usize = 6;
const SESSION_TTL_SECS: u64 = 3600;

struct Account {
    password: String,
    user: AuthUser,
}

#[derive(Default)]
struct AuthState {
    accounts: HashMap<String, Account>,
    sessions: HashMap<AccessToken, AuthUser>,
}

impl AuthState {
    fn issue_session(&mut self, user: AuthUser) -> Session {
        let access_token = AccessToken::new(Uuid::new_v4().simple().to_string());
        self.sessions.insert(access_token.clone(), user.clone());
        Session {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: SESSION_TTL_SECS,
            refresh_token: Uuid::new_v4().simple().to_string(),
            user,
        }
    }
}

/// In-process backend with the hosted platform's observable behaviour.
///
/// Each table is owned by its own [`TableActor`]; identity and storage state
/// sit behind async locks. Sign-ups are confirmed immediately.
#[derive(Clone)]
pub struct MemoryBackend {
    auth: Arc<RwLock<AuthState>>,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    customers: TableClient<Customer>,
    orders: TableClient<Order>,
    pricing_rules: TableClient<PricingRule>,
    files: TableClient<FileRecord>,
    profiles: TableClient<Profile>,
    companies: TableClient<Company>,
}

/// Spawns the actor owning one table and returns its client.
fn spawn_table<T: Record>(buffer_size: usize) -> TableClient<T> {
    let (actor, client) = TableActor::<T>::new(buffer_size);
    tokio::spawn(actor.run());
    client
}

impl MemoryBackend {
    /// Starts one actor per table. Must be called inside a tokio runtime.
    pub fn start() -> Self {
        info!("Starting in-memory backend");
        Self {
            auth: Arc::new(RwLock::new(AuthState::default())),
            objects: Arc::new(Mutex::new(HashMap::new())),
            customers: spawn_table(32),
            orders: spawn_table(32),
            pricing_rules: spawn_table(32),
            files: spawn_table(32),
            profiles: spawn_table(32),
            companies: spawn_table(32),
        }
    }

    /// Store fully formed rows, bypassing insert defaults.
    pub async fn seed<T: Record>(&self, rows: Vec<T>) -> BackendResult<usize>
    where
        Self: HasTable<T>,
    {
        HasTable::<T>::table(self).seed(rows).await.map_err(BackendError::Communication)
    }

    /// Contents of a stored object.
    #[cfg(test)]
    pub async fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().await.get(&object_key(bucket, path)).cloned()
    }
}

fn object_key(bucket: &str, path: &str) -> String {
    format!("{}/{}", bucket, path)
}

// =============================================================================
// TABLE WIRING
// =============================================================================

/// Gives access to the actor owning the table of `T`.
pub trait HasTable<T: Record> {
    fn table(&self) -> &TableClient<T>;
}

macro_rules! impl_has_table {
    ($($record:ty => $field:ident),* $(,)?) => {
        $(
            impl HasTable<$record> for MemoryBackend {
                fn table(&self) -> &TableClient<$record> {
                    &self.$field
                }
            }
        )*
    };
}

impl_has_table!(
    Customer => customers,
    Order => orders,
    PricingRule => pricing_rules,
    FileRecord => files,
    Profile => profiles,
    Company => companies,
);

#[async_trait]
impl<T: Record> RowStore<T> for MemoryBackend
where
    MemoryBackend: HasTable<T>,
{
    #[instrument(skip(self, _token, payload), fields(table = T::TABLE))]
    async fn insert(&self, _token: Option<&AccessToken>, payload: T::Create) -> BackendResult<T> {
        debug!("Sending request");
        HasTable::<T>::table(self)
            .insert(payload)
            .await
            .map_err(|message| BackendError::api(400, message))
    }

    #[instrument(skip(self, _token), fields(table = T::TABLE))]
    async fn select(&self, _token: Option<&AccessToken>, query: Query) -> BackendResult<Vec<T>> {
        debug!("Sending request");
        HasTable::<T>::table(self).select(query).await.map_err(BackendError::Communication)
    }
}

// =============================================================================
// IDENTITY AND STORAGE
// =============================================================================

#[async_trait]
impl AuthApi for MemoryBackend {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_up(&self, credentials: &Credentials) -> BackendResult<SignUpOutcome> {
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::api(
                422,
                format!("Password should be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }

        let mut auth = self.auth.write().await;
        let email = credentials.email.to_lowercase();
        if auth.accounts.contains_key(&email) {
            return Err(BackendError::api(422, "User already registered"));
        }

        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.clone()),
        };
        auth.accounts.insert(
            email,
            Account {
                password: credentials.password.clone(),
                user: user.clone(),
            },
        );
        let session = auth.issue_session(user.clone());
        info!(user_id = %user.id, "User registered");
        Ok(SignUpOutcome {
            user: Some(user),
            session: Some(session),
        })
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_in(&self, credentials: &Credentials) -> BackendResult<Session> {
        let mut auth = self.auth.write().await;
        let user = match auth.accounts.get(&credentials.email.to_lowercase()) {
            Some(account) if account.password == credentials.password => account.user.clone(),
            _ => return Err(BackendError::api(400, "Invalid login credentials")),
        };
        Ok(auth.issue_session(user))
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, token: &AccessToken) -> BackendResult<()> {
        self.auth.write().await.sessions.remove(token);
        Ok(())
    }

    #[instrument(skip_all)]
    async fn current_user(&self, token: &AccessToken) -> BackendResult<Option<AuthUser>> {
        Ok(self.auth.read().await.sessions.get(token).cloned())
    }
}

#[async_trait]
impl ObjectStorage for MemoryBackend {
    #[instrument(skip(self, token, object), fields(bucket = object.bucket, path = object.path))]
    async fn upload(&self, token: &AccessToken, object: StorageObject<'_>) -> BackendResult<()> {
        if !self.auth.read().await.sessions.contains_key(token) {
            return Err(BackendError::api(403, "new row violates row-level security policy"));
        }

        let mut objects = self.objects.lock().await;
        let key = object_key(object.bucket, object.path);
        if objects.contains_key(&key) {
            return Err(BackendError::api(409, "The resource already exists"));
        }
        objects.insert(key, object.bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::find_one;
    use crate::domain::PricingRuleCreate;

    #[tokio::test]
    async fn test_sign_up_sign_in_and_sign_out() {
        let backend = MemoryBackend::start();
        let credentials = Credentials::new("Ops@Example.com", "secret-pass");

        let outcome = backend.sign_up(&credentials).await.unwrap();
        let user = outcome.into_user().unwrap();

        let session = backend
            .sign_in(&Credentials::new("ops@example.com", "secret-pass"))
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(
            backend.current_user(&session.access_token).await.unwrap(),
            Some(user)
        );

        backend.sign_out(&session.access_token).await.unwrap();
        assert_eq!(backend.current_user(&session.access_token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_and_bad_password_use_platform_messages() {
        let backend = MemoryBackend::start();
        let credentials = Credentials::new("ops@example.com", "secret-pass");
        backend.sign_up(&credentials).await.unwrap();

        let duplicate = backend.sign_up(&credentials).await.unwrap_err();
        assert_eq!(duplicate.to_string(), "User already registered");

        let wrong = backend
            .sign_in(&Credentials::new("ops@example.com", "nope-nope"))
            .await
            .unwrap_err();
        assert_eq!(wrong.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_upload_requires_session_and_never_overwrites() {
        let backend = MemoryBackend::start();
        let session = backend
            .sign_up(&Credentials::new("ops@example.com", "secret-pass"))
            .await
            .unwrap()
            .session
            .unwrap();
        let object = StorageObject {
            bucket: "art-files",
            path: "job-1/1-front.pdf",
            content_type: "application/pdf",
            bytes: b"%PDF",
        };

        let anonymous = backend.upload(&AccessToken::new("forged"), object).await;
        assert!(matches!(anonymous, Err(BackendError::Api { status: 403, .. })));

        backend.upload(&session.access_token, object).await.unwrap();
        let again = backend.upload(&session.access_token, object).await;
        assert!(matches!(again, Err(BackendError::Api { status: 409, .. })));
        assert_eq!(
            backend.object("art-files", "job-1/1-front.pdf").await,
            Some(b"%PDF".to_vec())
        );
    }

    #[tokio::test]
    async fn test_rows_are_selected_per_table() {
        let backend = MemoryBackend::start();
        let rule: PricingRule = RowStore::<PricingRule>::insert(
            &backend,
            None,
            PricingRuleCreate {
                product_type: "flyers".into(),
                paper_type: "100# Gloss Text".into(),
                paper_cost_per_sheet: 0.12,
                setup_minutes: 30.0,
                run_speed_per_hour: 1000.0,
                press_rate_per_hour: 90.0,
                markup: 1.6,
                rush_multiplier: 1.4,
            },
        )
        .await
        .unwrap();

        let found: Option<PricingRule> = find_one(
            &backend,
            None,
            Query::new().eq("product_type", "flyers").eq("paper_type", "100# Gloss Text"),
        )
        .await
        .unwrap();
        assert_eq!(found, Some(rule));

        let customers: Vec<Customer> = backend.select(None, Query::new()).await.unwrap();
        assert!(customers.is_empty());
    }
}
