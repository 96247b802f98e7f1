use std::time::Duration;

use tokio::time::interval;

use crate::core::error::Result;
use crate::modules::persistence::{SoftDeletable, SoftDeleteAdmin};

/// Background worker that purges tombstones older than the retention period
pub struct RetentionSweeper {
    admin: SoftDeleteAdmin,
    retention_days: i64,
    period: Duration,
}

impl RetentionSweeper {
    pub fn new(admin: SoftDeleteAdmin, retention_days: i64, period: Duration) -> Self {
        Self {
            admin,
            retention_days,
            period,
        }
    }

    /// Run the sweeper in a background loop
    pub async fn run(&self) {
        tracing::info!(
            retention_days = self.retention_days,
            period_secs = self.period.as_secs(),
            "Starting soft-delete retention sweeper"
        );

        let mut interval = interval(self.period);

        loop {
            interval.tick().await;

            let purged = self.sweep().await;
            if purged > 0 {
                tracing::info!(purged, "Retention sweep purged expired tombstones");
            }
        }
    }

    /// One pass over every soft-deletable entity. A failing entity is logged
    /// and skipped.
    pub async fn sweep(&self) -> u64 {
        let mut total = 0;
        for entity in SoftDeletable::ALL {
            match self.sweep_entity(entity).await {
                Ok(purged) => total += purged,
                Err(e) => {
                    tracing::error!(entity = %entity, "Retention sweep failed: {:?}", e);
                }
            }
        }
        total
    }

    async fn sweep_entity(&self, entity: SoftDeletable) -> Result<u64> {
        let purged = self
            .admin
            .cleanup_old_deleted(entity, self.retention_days)
            .await?;
        if purged > 0 {
            tracing::debug!(entity = %entity, purged, "Purged expired tombstones");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persistence::{SoftDeleteGuard, Table};
    use crate::shared::test_helpers::MemoryStore;
    use chrono::{Duration as ChronoDuration, Utc};
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_sweep_purges_expired_tombstones_across_entities() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let expired = now - ChronoDuration::days(31);

        store.insert(
            Table::Characters,
            json!({ "id": Uuid::new_v4(), "name": "Gone", "deleted_at": expired }),
        );
        store.insert(
            Table::Comments,
            json!({ "id": Uuid::new_v4(), "body": "old", "deleted_at": expired }),
        );
        store.insert(
            Table::Comments,
            json!({ "id": Uuid::new_v4(), "body": "fresh", "deleted_at": now }),
        );
        store.insert(
            Table::Resources,
            json!({ "id": Uuid::new_v4(), "name": "Live", "deleted_at": null }),
        );

        let guard = SoftDeleteGuard::new(store.clone());
        let sweeper = RetentionSweeper::new(guard.admin(), 30, Duration::from_secs(3600));

        assert_eq!(sweeper.sweep().await, 2);
        assert!(store.rows(Table::Characters).is_empty());
        assert_eq!(store.rows(Table::Comments).len(), 1);
        assert_eq!(store.rows(Table::Resources).len(), 1);
        assert_eq!(sweeper.sweep().await, 0);
    }
}
