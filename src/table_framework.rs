use std::cmp::Ordering;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

// =============================================================================
// 1. THE ABSTRACTION (Rows, Create Payloads, and Queries)
// =============================================================================

/// Trait that any table row must implement to be stored by the backend.
///
/// Rows travel as JSON with snake_case column names, so the same type is read
/// from the hosted store and held by the in-memory [`TableActor`].
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table the row lives in.
    const TABLE: &'static str;

    /// Insert payload; columns the store fills in (id, timestamps) are absent.
    type Create: Debug + Serialize + Send + Sync + 'static;

    /// Construct the full row from store-generated columns and the payload.
    ///
    /// Rows keyed by an externally supplied id ignore `id`.
    fn from_create(id: Uuid, created_at: DateTime<Utc>, payload: Self::Create) -> Result<Self, String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

/// Row selection: equality filters, one sort column and an optional limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, String)>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((column.into(), value.to_string()));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(OrderBy {
            column: column.into(),
            descending: true,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string parameters in the REST row API's filter syntax.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        for (column, value) in &self.filters {
            params.push((column.clone(), format!("eq.{}", value)));
        }
        if let Some(order) = &self.order_by {
            let direction = if order.descending { "desc" } else { "asc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Whether a serialized row passes every equality filter.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|(column, expected)| match row.get(column) {
            Some(Value::String(actual)) => actual == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        })
    }

    /// Sort, then truncate, already-filtered rows.
    pub fn arrange(&self, rows: &mut Vec<Value>) {
        if let Some(order) = &self.order_by {
            rows.sort_by(|a, b| {
                let ordering = compare_columns(a.get(&order.column), b.get(&order.column));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
    }
}

/// Timestamps compare chronologically, numbers numerically, everything else as text.
fn compare_columns(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None, Some(_)) | (Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None) | (Some(_), Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, String>>;

#[derive(Debug)]
pub enum TableRequest<T: Record> {
    Insert {
        payload: T::Create,
        respond_to: Response<T>,
    },
    Select {
        query: Query,
        respond_to: Response<Vec<T>>,
    },
    /// Store fully formed rows as-is, e.g. reference data or fixtures.
    Seed {
        rows: Vec<T>,
        respond_to: Response<usize>,
    },
}

// =============================================================================
// 3. THE GENERIC TABLE ACTOR
// =============================================================================

/// Single owner of one in-memory table. Rows keep insertion order.
pub struct TableActor<T: Record> {
    receiver: mpsc::Receiver<TableRequest<T>>,
    rows: Vec<T>,
}

impl<T: Record> TableActor<T> {
    pub fn new(buffer_size: usize) -> (Self, TableClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            rows: Vec::new(),
        };
        (actor, TableClient::new(sender))
    }

    pub async fn run(mut self) {
        tracing::debug!(table = T::TABLE, "Table actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                TableRequest::Insert { payload, respond_to } => {
                    let result = T::from_create(Uuid::new_v4(), Utc::now(), payload).map(|row| {
                        self.rows.push(row.clone());
                        row
                    });
                    let _ = respond_to.send(result);
                }
                TableRequest::Select { query, respond_to } => {
                    let _ = respond_to.send(self.select(&query));
                }
                TableRequest::Seed { rows, respond_to } => {
                    let count = rows.len();
                    self.rows.extend(rows);
                    let _ = respond_to.send(Ok(count));
                }
            }
        }
        tracing::debug!(table = T::TABLE, "Table actor stopped");
    }

    fn select(&self, query: &Query) -> Result<Vec<T>, String> {
        let mut matching = Vec::new();
        for row in &self.rows {
            let value = serde_json::to_value(row).map_err(|e| e.to_string())?;
            if query.matches(&value) {
                matching.push(value);
            }
        }
        query.arrange(&mut matching);
        matching
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(|e| e.to_string()))
            .collect()
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct TableClient<T: Record> {
    sender: mpsc::Sender<TableRequest<T>>,
}

impl<T: Record> TableClient<T> {
    pub fn new(sender: mpsc::Sender<TableRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn insert(&self, payload: T::Create) -> Result<T, String> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(TableRequest::Insert { payload, respond_to })
            .await.map_err(|_| "Table closed".to_string())?;
        response.await.map_err(|_| "Table dropped".to_string())?
    }

    pub async fn select(&self, query: Query) -> Result<Vec<T>, String> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(TableRequest::Select { query, respond_to })
            .await.map_err(|_| "Table closed".to_string())?;
        response.await.map_err(|_| "Table dropped".to_string())?
    }

    pub async fn seed(&self, rows: Vec<T>) -> Result<usize, String> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(TableRequest::Seed { rows, respond_to })
            .await.map_err(|_| "Table closed".to_string())?;
        response.await.map_err(|_| "Table dropped".to_string())?
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Uuid,
        owner: String,
        body: String,
        created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize)]
    struct NoteCreate {
        owner: String,
        body: String,
    }

    impl Record for Note {
        const TABLE: &'static str = "notes";
        type Create = NoteCreate;

        fn from_create(id: Uuid, created_at: DateTime<Utc>, payload: NoteCreate) -> Result<Self, String> {
            if payload.body.is_empty() {
                return Err("body must not be empty".to_string());
            }
            Ok(Self {
                id,
                owner: payload.owner,
                body: payload.body,
                created_at,
            })
        }
    }

    fn note(owner: &str, body: &str, created_at: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            body: body.to_string(),
            created_at: DateTime::parse_from_rfc3339(created_at).unwrap().with_timezone(&Utc),
        }
    }

    #[tokio::test]
    async fn test_insert_then_select_by_column() {
        let (actor, client) = TableActor::<Note>::new(10);
        tokio::spawn(actor.run());

        let created = client
            .insert(NoteCreate { owner: "alice".into(), body: "hello".into() })
            .await
            .unwrap();
        client
            .insert(NoteCreate { owner: "bob".into(), body: "hi".into() })
            .await
            .unwrap();

        let alice = client.select(Query::new().eq("owner", "alice")).await.unwrap();
        assert_eq!(alice, vec![created]);
    }

    #[tokio::test]
    async fn test_create_hook_rejection_is_returned() {
        let (actor, client) = TableActor::<Note>::new(10);
        tokio::spawn(actor.run());

        let result = client
            .insert(NoteCreate { owner: "alice".into(), body: String::new() })
            .await;
        assert_eq!(result, Err("body must not be empty".to_string()));
        assert!(client.select(Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_desc_compares_timestamps_chronologically() {
        let (actor, client) = TableActor::<Note>::new(10);
        tokio::spawn(actor.run());

        client
            .seed(vec![
                note("alice", "first", "2025-12-01T10:00:00Z"),
                note("alice", "third", "2025-12-01T10:00:00.500Z"),
                note("alice", "second", "2025-12-01T10:00:00.120Z"),
            ])
            .await
            .unwrap();

        let rows = client
            .select(Query::new().eq("owner", "alice").order_desc("created_at").limit(2))
            .await
            .unwrap();
        let bodies: Vec<&str> = rows.iter().map(|n| n.body.as_str()).collect();
        assert_eq!(bodies, vec!["third", "second"]);
    }

    #[test]
    fn test_query_params_use_rest_filter_syntax() {
        let params = Query::new()
            .eq("customer_id", "abc")
            .order_desc("created_at")
            .limit(1)
            .to_params();
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("customer_id".to_string(), "eq.abc".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_closed_table_reports_error() {
        let (actor, client) = TableActor::<Note>::new(10);
        drop(actor);
        let result = client.select(Query::new()).await;
        assert_eq!(result, Err("Table closed".to_string()));
    }
}
