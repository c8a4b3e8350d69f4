use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::PgPool;
use tokio::sync::{Mutex, RwLock};
use tracing::error;

pub const HISTORY_KEY: &str = "food_history";
pub const PROFILE_KEY: &str = "user_profile_data";
pub const RECIPES_KEY: &str = "discovered_recipes";
pub const WELLNESS_KEY: &str = "wellness_data";
pub const LAST_WELLNESS_CHECK_KEY: &str = "last_wellness_check";
pub const REMINDER_SETTINGS_KEY: &str = "reminder_settings";
pub const NUTRITION_TIPS_KEY: &str = "nutrition_tips_data";
pub const NOTIFICATIONS_KEY: &str = "active_notifications";

/// String key-value backend. Values are JSON documents.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgKvStore {
    db: PgPool,
}

impl PgKvStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KvStore for PgKvStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT value
            FROM kv_store
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("kv get {}", key))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .with_context(|| format!("kv set {}", key))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM kv_store WHERE key = $1"#)
            .bind(key)
            .execute(&self.db)
            .await
            .with_context(|| format!("kv remove {}", key))?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Typed JSON access over a [`KvStore`].
///
/// Every mutation of a key runs under that key's lock, so a read-modify-write
/// through [`Store::update_json`] cannot interleave with another writer of the
/// same key inside this process.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KvStore>,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl Store {
    pub fn new(backend: Arc<dyn KvStore>) -> Self {
        Self {
            backend,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()))
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.backend.get(key).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("decode stored value for {}", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value).with_context(|| format!("encode {}", key))?;
        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;
        self.backend.set(key, &raw).await
    }

    pub async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;
        self.backend.remove(key).await
    }

    /// Reads the value under `key`, lets `f` mutate it and writes the result back.
    /// Leaving the slot as `None` deletes the key. A stored value that no longer
    /// decodes is logged and handed to `f` as `None`, so the write replaces it.
    pub async fn update_json<T, R, F>(&self, key: &str, f: F) -> anyhow::Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Option<T>) -> R,
    {
        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;

        let mut slot: Option<T> = match self.backend.get(key).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    error!(error = %e, key, "stored value is unreadable; replacing it");
                    None
                }
            },
            None => None,
        };
        let out = f(&mut slot);
        match slot {
            Some(value) => {
                let raw = serde_json::to_string(&value).with_context(|| format!("encode {}", key))?;
                self.backend.set(key, &raw).await?;
            }
            None => self.backend.remove(key).await?,
        }
        Ok(out)
    }
}
