use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::{PurgeResultDto, RestoredEntryDto, TrashEntryDto};
use crate::modules::persistence::{
    Filter, FindOptions, SoftDeletable, SoftDeleteAdmin, SortDirection, DELETED_AT,
};
use crate::shared::constants::MAX_RETENTION_DAYS;

/// Administrative view over tombstoned rows
pub struct TrashService {
    admin: SoftDeleteAdmin,
}

impl TrashService {
    pub fn new(admin: SoftDeleteAdmin) -> Self {
        Self { admin }
    }

    /// Most recently deleted first
    pub async fn list(
        &self,
        entity: SoftDeletable,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<TrashEntryDto>, i64)> {
        let options = FindOptions::new()
            .order_by(DELETED_AT, SortDirection::Desc)
            .paginate(offset, limit);
        let rows = self
            .admin
            .find_deleted(entity, &Filter::new(), &options)
            .await?;
        let total = self.admin.count_deleted(entity, &Filter::new()).await?;

        let entries = rows
            .into_iter()
            .map(|row| TrashEntryDto::from_row(entity, row))
            .collect::<Result<Vec<_>>>()?;
        Ok((entries, total))
    }

    /// Restore a row along with the dependents deleted alongside it
    pub async fn restore(&self, entity: SoftDeletable, id: Uuid) -> Result<RestoredEntryDto> {
        let (record, dependents) = self
            .admin
            .restore_cascade(entity, id)
            .await?
            .ok_or_else(|| not_in_trash(entity, id))?;
        tracing::info!(entity = %entity, id = %id, dependents, "Restored from trash");
        Ok(RestoredEntryDto {
            entity,
            id,
            record,
            dependents,
        })
    }

    pub async fn purge(&self, entity: SoftDeletable, id: Uuid) -> Result<()> {
        if !self.admin.hard_delete(entity, id).await? {
            return Err(not_in_trash(entity, id));
        }
        tracing::info!(entity = %entity, id = %id, "Purged from trash");
        Ok(())
    }

    pub async fn cleanup(&self, entity: SoftDeletable, days_old: i64) -> Result<PurgeResultDto> {
        if !(0..=MAX_RETENTION_DAYS).contains(&days_old) {
            return Err(AppError::BadRequest(format!(
                "daysOld must be between 0 and {}",
                MAX_RETENTION_DAYS
            )));
        }
        let purged = self.admin.cleanup_old_deleted(entity, days_old).await?;
        tracing::info!(entity = %entity, days_old, purged, "Trash cleanup finished");
        Ok(PurgeResultDto { purged })
    }
}

fn not_in_trash(entity: SoftDeletable, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {} is not in trash", entity, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persistence::{decode, Changes, SoftDeleteGuard, Table};
    use crate::shared::test_helpers::MemoryStore;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    async fn live_character(guard: &SoftDeleteGuard, name: &str) -> Uuid {
        let row = guard
            .create(Table::Characters, &Changes::new().set("name", name))
            .await
            .unwrap();
        decode(row["id"].clone()).unwrap()
    }

    #[tokio::test]
    async fn test_trash_lists_only_tombstones_newest_first() {
        let guard = SoftDeleteGuard::new(Arc::new(MemoryStore::new()));
        let service = TrashService::new(guard.admin());
        let aria = live_character(&guard, "Aria").await;
        let kai = live_character(&guard, "Kai").await;
        live_character(&guard, "Mo").await;

        guard.admin().soft_delete(SoftDeletable::Character, aria).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        guard.admin().soft_delete(SoftDeletable::Character, kai).await.unwrap();

        let (entries, total) = service.list(SoftDeletable::Character, 0, 10).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(entries[0].id, kai);
        assert_eq!(entries[1].id, aria);
        assert_eq!(entries[0].record["name"], "Kai");
    }

    #[tokio::test]
    async fn test_restore_and_purge_require_a_tombstone() {
        let guard = SoftDeleteGuard::new(Arc::new(MemoryStore::new()));
        let service = TrashService::new(guard.admin());
        let aria = live_character(&guard, "Aria").await;

        assert!(matches!(
            service.restore(SoftDeletable::Character, aria).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.purge(SoftDeletable::Character, aria).await,
            Err(AppError::NotFound(_))
        ));
        assert!(guard.find_unique(Table::Characters, aria).await.unwrap().is_some());

        guard.admin().soft_delete(SoftDeletable::Character, aria).await.unwrap();
        let restored = service.restore(SoftDeletable::Character, aria).await.unwrap();
        assert!(restored.record["deleted_at"].is_null());

        guard.admin().soft_delete(SoftDeletable::Character, aria).await.unwrap();
        service.purge(SoftDeletable::Character, aria).await.unwrap();
        assert!(!guard
            .exists_including_deleted(Table::Characters, &Filter::by_id(aria))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_respects_age_and_rejects_out_of_range_days() {
        let store = Arc::new(MemoryStore::new());
        let guard = SoftDeleteGuard::new(store.clone());
        let service = TrashService::new(guard.admin());

        let now = Utc::now();
        for (name, age) in [("old", 40), ("recent", 2)] {
            store.insert(
                Table::WikiPages,
                json!({
                    "id": Uuid::new_v4(),
                    "slug": name,
                    "title": name,
                    "content": "",
                    "character_id": null,
                    "created_at": now - Duration::days(age + 1),
                    "updated_at": now - Duration::days(age + 1),
                    "deleted_at": now - Duration::days(age),
                }),
            );
        }

        assert!(matches!(
            service.cleanup(SoftDeletable::WikiPage, -1).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.cleanup(SoftDeletable::WikiPage, i64::MAX).await,
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(store.rows(Table::WikiPages).len(), 2);

        let result = service.cleanup(SoftDeletable::WikiPage, 30).await.unwrap();
        assert_eq!(result.purged, 1);
        let remaining = store.rows(Table::WikiPages);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["slug"], "recent");
    }
}
