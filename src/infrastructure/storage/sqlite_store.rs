use crate::application::ports::queue_store::{DurableQueueStore, OFFLINE_QUEUE_KEY};
use crate::domain::entities::PendingWrite;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Pool, Sqlite};
use tokio::sync::Mutex;
use tracing::warn;

const KV_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)
"#;

/// SQLite-backed durable key-value store.
///
/// The pending queue lives under `"offlineQuote"` as a JSON array in FIFO
/// order; read-model listings live under their own keys. A store-level
/// mutex serializes every queue read-modify-write so two concurrent
/// appends cannot lose an entry.
pub struct SqliteQueueStore {
    pool: Pool<Sqlite>,
    queue_lock: Mutex<()>,
}

impl SqliteQueueStore {
    /// Create the store and its schema.
    pub async fn init(pool: Pool<Sqlite>) -> Result<Self, AppError> {
        sqlx::query(KV_TABLE_SQL).execute(&pool).await?;
        Ok(Self {
            pool,
            queue_lock: Mutex::new(()),
        })
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fail-open queue read: a missing, unreadable, or corrupt value is an
    /// empty queue. Per-element corruption skips the element instead of
    /// discarding the rest; the version tag gives future formats a
    /// migration point.
    async fn read_queue(&self) -> Vec<PendingWrite> {
        let raw = match self.get_raw(OFFLINE_QUEUE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(%err, "failed to read pending queue, treating as empty");
                return Vec::new();
            }
        };

        let elements: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(elements) => elements,
            Err(err) => {
                warn!(%err, "corrupt pending queue, treating as empty");
                return Vec::new();
            }
        };

        elements
            .into_iter()
            .filter_map(|element| match serde_json::from_value(element) {
                Ok(write) => Some(write),
                Err(err) => {
                    warn!(%err, "skipping unreadable pending queue entry");
                    None
                }
            })
            .collect()
    }

    async fn write_queue(&self, writes: &[PendingWrite]) -> Result<(), AppError> {
        let serialized = serde_json::to_string(writes)?;
        self.set_raw(OFFLINE_QUEUE_KEY, &serialized).await?;
        Ok(())
    }
}

#[async_trait]
impl DurableQueueStore for SqliteQueueStore {
    async fn append(&self, write: PendingWrite) -> Result<(), AppError> {
        let _guard = self.queue_lock.lock().await;
        let mut queue = self.read_queue().await;
        queue.push(write);
        self.write_queue(&queue).await
    }

    async fn load_all(&self) -> Result<Vec<PendingWrite>, AppError> {
        let _guard = self.queue_lock.lock().await;
        Ok(self.read_queue().await)
    }

    async fn replace_all(&self, writes: Vec<PendingWrite>) -> Result<(), AppError> {
        let _guard = self.queue_lock.lock().await;
        self.write_queue(&writes).await
    }

    async fn get_cached(&self, key: &str) -> Result<Option<Value>, AppError> {
        let raw = match self.get_raw(key).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, key, "failed to read cached value, treating as absent");
                return Ok(None);
            }
        };
        match raw {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    warn!(%err, key, "corrupt cached value, treating as absent");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn set_cached(&self, key: &str, value: Value) -> Result<(), AppError> {
        let serialized = serde_json::to_string(&value)?;
        self.set_raw(key, &serialized).await?;
        Ok(())
    }
}
