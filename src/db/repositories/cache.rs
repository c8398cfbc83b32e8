use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::time::Duration;
use tracing::debug;

use crate::entities::{cache_entries, prelude::*};
use crate::services::cache::{CacheError, CacheStore};

/// SQLite-backed [`CacheStore`]. Survives restarts and can be shared by
/// several processes pointing at the same file.
pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Deletes expired rows, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        let result = CacheEntries::delete_many()
            .filter(cache_entries::Column::ExpiresAt.lte(now_millis()))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn expiry_after(ttl: Duration) -> i64 {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now_millis().saturating_add(ttl_ms)
}

#[async_trait::async_trait]
impl CacheStore for CacheRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entry = CacheEntries::find_by_id(key.to_string())
            .filter(cache_entries::Column::ExpiresAt.gt(now_millis()))
            .one(&self.conn)
            .await?;

        Ok(entry.map(|e| e.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        // Opportunistic cleanup
        match self.purge_expired().await {
            Ok(0) => {}
            Ok(purged) => debug!(purged, "Purged expired cache rows"),
            Err(e) => debug!(error = %e, "Expired cache row purge failed"),
        }

        let active_model = cache_entries::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            expires_at: Set(expiry_after(ttl)),
        };

        CacheEntries::insert(active_model)
            .on_conflict(
                OnConflict::column(cache_entries::Column::Key)
                    .update_columns([
                        cache_entries::Column::Value,
                        cache_entries::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    async fn touch(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        CacheEntries::update_many()
            .col_expr(
                cache_entries::Column::ExpiresAt,
                Expr::value(expiry_after(ttl)),
            )
            .filter(cache_entries::Column::Key.eq(key))
            .filter(cache_entries::Column::ExpiresAt.gt(now_millis()))
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    async fn repo() -> CacheRepository {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        store.cache_repo()
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let repo = repo().await;

        repo.set("FR:Pari", "[1,2]", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(repo.get("FR:Pari").await.unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(repo.get("FR:Lyo").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_key() {
        let repo = repo().await;

        repo.set("k", "old", Duration::from_secs(60)).await.unwrap();
        repo.set("k", "new", Duration::from_secs(60)).await.unwrap();

        assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_expired_rows_are_invisible_and_purged() {
        let repo = repo().await;

        repo.set("k", "v", Duration::from_millis(30)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(repo.get("k").await.unwrap(), None);
        assert_eq!(repo.purge_expired().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_touch_extends_live_entry_only() {
        let repo = repo().await;

        repo.set("live", "v", Duration::from_millis(100)).await.unwrap();
        repo.set("dead", "v", Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        repo.touch("live", Duration::from_secs(60)).await.unwrap();
        repo.touch("dead", Duration::from_secs(60)).await.unwrap();
        repo.touch("missing", Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(repo.get("live").await.unwrap().as_deref(), Some("v"));
        assert_eq!(repo.get("dead").await.unwrap(), None);
        assert_eq!(repo.get("missing").await.unwrap(), None);
    }
}
