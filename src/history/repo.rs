use tracing::{debug, error};

use crate::food::services::FoodIdentification;
use crate::storage::{Store, HISTORY_KEY};

pub const HISTORY_LIMIT: usize = 50;

/// Newest-first log of identified foods, capped at [`HISTORY_LIMIT`].
///
/// Storage failures are logged and swallowed: reads come back empty and
/// writes leave the stored list as it was.
#[derive(Clone)]
pub struct HistoryStore {
    store: Store,
}

impl HistoryStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn append(&self, item: FoodIdentification) {
        let res = self
            .store
            .update_json::<Vec<FoodIdentification>, _, _>(HISTORY_KEY, |slot| {
                let list = slot.get_or_insert_with(Vec::new);
                list.insert(0, item);
                list.truncate(HISTORY_LIMIT);
                list.len()
            })
            .await;
        match res {
            Ok(len) => debug!(len, "history appended"),
            Err(e) => error!(error = %e, key = HISTORY_KEY, "error saving to history"),
        }
    }

    pub async fn list(&self) -> Vec<FoodIdentification> {
        match self.store.read_json::<Vec<FoodIdentification>>(HISTORY_KEY).await {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                error!(error = %e, key = HISTORY_KEY, "error getting history");
                Vec::new()
            }
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(HISTORY_KEY).await {
            error!(error = %e, key = HISTORY_KEY, "error clearing history");
        }
    }

    /// Drops every entry whose timestamp equals `timestamp`. Returns how many went.
    pub async fn remove(&self, timestamp: i64) -> usize {
        let res = self
            .store
            .update_json::<Vec<FoodIdentification>, _, _>(HISTORY_KEY, |slot| match slot {
                Some(list) => {
                    let before = list.len();
                    list.retain(|f| f.timestamp != timestamp);
                    before - list.len()
                }
                None => 0,
            })
            .await;
        res.unwrap_or_else(|e| {
            error!(error = %e, key = HISTORY_KEY, timestamp, "error removing from history");
            0
        })
    }
}

#[cfg(test)]
mod history_tests {
    use super::*;
    use crate::food::category::FoodCategory;
    use crate::storage::test_support::broken_store;

    fn item(n: i64) -> FoodIdentification {
        FoodIdentification {
            name: format!("food {}", n),
            confidence: 0.9,
            category: FoodCategory::Food,
            timestamp: n,
            nutritional_info: None,
        }
    }

    #[tokio::test]
    async fn append_is_newest_first() {
        let history = HistoryStore::new(Store::in_memory());
        history.append(item(1)).await;
        history.append(item(2)).await;
        let list = history.list().await;
        assert_eq!(list.iter().map(|f| f.timestamp).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[tokio::test]
    async fn fifty_one_appends_evict_the_oldest() {
        let history = HistoryStore::new(Store::in_memory());
        for n in 1..=51 {
            history.append(item(n)).await;
        }
        let list = history.list().await;
        assert_eq!(list.len(), HISTORY_LIMIT);
        assert_eq!(list.first().unwrap().timestamp, 51);
        assert_eq!(list.last().unwrap().timestamp, 2);
        assert!(list.iter().all(|f| f.timestamp != 1));
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_kept() {
        let history = HistoryStore::new(Store::in_memory());
        let tasks: Vec<_> = (0..20)
            .map(|n| {
                let h = history.clone();
                tokio::spawn(async move { h.append(item(n)).await })
            })
            .collect();
        for t in tasks {
            t.await.unwrap();
        }
        assert_eq!(history.list().await.len(), 20);
    }

    #[tokio::test]
    async fn append_recovers_from_corrupt_history() {
        use crate::storage::{KvStore, MemoryKvStore};
        use std::sync::Arc;

        let backend = Arc::new(MemoryKvStore::new());
        backend.set(HISTORY_KEY, "{not json").await.unwrap();
        let history = HistoryStore::new(Store::new(backend));
        assert!(history.list().await.is_empty());

        history.append(item(1)).await;
        let list = history.list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].timestamp, 1);
    }

    #[tokio::test]
    async fn clear_and_remove_by_timestamp() {
        let history = HistoryStore::new(Store::in_memory());
        for n in 1..=3 {
            history.append(item(n)).await;
        }
        assert_eq!(history.remove(2).await, 1);
        assert_eq!(history.remove(99).await, 0);
        let left: Vec<_> = history.list().await.iter().map(|f| f.timestamp).collect();
        assert_eq!(left, vec![3, 1]);

        history.clear().await;
        assert!(history.list().await.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_reads_as_empty() {
        let history = HistoryStore::new(broken_store());
        history.append(item(1)).await;
        history.clear().await;
        assert_eq!(history.remove(1).await, 0);
        assert!(history.list().await.is_empty());
    }
}
