//! Soft-delete guard.
//!
//! [`SoftDeleteGuard`] is the store every feature service talks to. For the
//! six soft-deletable tables it merges `deleted_at IS NULL` into the filter
//! of every read and update, after the caller's own predicates, so a caller
//! cannot widen the scope to tombstoned rows. Other tables pass through
//! untouched, as do `create` and `delete_many`.
//!
//! [`SoftDeleteAdmin`] is the explicit lifecycle surface: tombstoning,
//! restoring, purging, and listing the trash. It reaches the raw store
//! directly and never goes through the guard.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::modules::persistence::filter::{
    live, tombstoned, Changes, Condition, FieldValue, Filter, FindOptions,
};
use crate::modules::persistence::store::{decode, EntityStore, Row};
use crate::modules::persistence::table::{SoftDeletable, Table, DELETED_AT};

#[derive(Clone)]
pub struct SoftDeleteGuard {
    store: Arc<dyn EntityStore>,
}

impl SoftDeleteGuard {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub fn admin(&self) -> SoftDeleteAdmin {
        SoftDeleteAdmin {
            store: self.store.clone(),
        }
    }

    fn scoped(table: Table, filter: &Filter) -> Filter {
        match table.soft_deletable() {
            Some(_) => filter.clone().merge(live()),
            None => filter.clone(),
        }
    }

    pub async fn create(&self, table: Table, values: &Changes) -> Result<Row> {
        self.store.create(table, values).await
    }

    pub async fn find_unique(&self, table: Table, id: Uuid) -> Result<Option<Row>> {
        self.find_first(table, &Filter::by_id(id)).await
    }

    pub async fn find_first(&self, table: Table, filter: &Filter) -> Result<Option<Row>> {
        self.store
            .find_first(table, &Self::scoped(table, filter))
            .await
    }

    pub async fn find_many(
        &self,
        table: Table,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Row>> {
        self.store
            .find_many(table, &Self::scoped(table, filter), options)
            .await
    }

    pub async fn update(
        &self,
        table: Table,
        filter: &Filter,
        changes: &Changes,
    ) -> Result<Option<Row>> {
        self.store
            .update(table, &Self::scoped(table, filter), changes)
            .await
    }

    pub async fn update_many(
        &self,
        table: Table,
        filter: &Filter,
        changes: &Changes,
    ) -> Result<u64> {
        self.store
            .update_many(table, &Self::scoped(table, filter), changes)
            .await
    }

    pub async fn count(&self, table: Table, filter: &Filter) -> Result<i64> {
        self.store.count(table, &Self::scoped(table, filter)).await
    }

    /// Physical delete; only meant for tables outside the soft-delete set
    pub async fn delete_many(&self, table: Table, filter: &Filter) -> Result<u64> {
        self.store.delete_many(table, filter).await
    }

    /// Existence check that ignores tombstones, for uniqueness pre-checks
    pub async fn exists_including_deleted(&self, table: Table, filter: &Filter) -> Result<bool> {
        Ok(self.store.count(table, filter).await? > 0)
    }
}

/// Lifecycle operations on soft-deletable entities
#[derive(Clone)]
pub struct SoftDeleteAdmin {
    store: Arc<dyn EntityStore>,
}

impl SoftDeleteAdmin {
    /// LIVE -> TOMBSTONED. Returns `None` if the row is absent or already tombstoned.
    pub async fn soft_delete(&self, entity: SoftDeletable, id: Uuid) -> Result<Option<Row>> {
        let filter = Filter::by_id(id).merge(live());
        let changes = Changes::new().set(DELETED_AT, Utc::now());
        self.store.update(entity.table(), &filter, &changes).await
    }

    pub async fn soft_delete_many(&self, entity: SoftDeletable, filter: &Filter) -> Result<u64> {
        let filter = filter.clone().merge(live());
        let changes = Changes::new().set(DELETED_AT, Utc::now());
        self.store
            .update_many(entity.table(), &filter, &changes)
            .await
    }

    /// TOMBSTONED -> LIVE. Returns `None` if the row is absent or live.
    pub async fn restore(&self, entity: SoftDeletable, id: Uuid) -> Result<Option<Row>> {
        let filter = Filter::by_id(id).merge(tombstoned());
        let changes = Changes::new().set(DELETED_AT, FieldValue::Null);
        self.store.update(entity.table(), &filter, &changes).await
    }

    pub async fn restore_many(&self, entity: SoftDeletable, filter: &Filter) -> Result<u64> {
        let filter = filter.clone().merge(tombstoned());
        let changes = Changes::new().set(DELETED_AT, FieldValue::Null);
        self.store
            .update_many(entity.table(), &filter, &changes)
            .await
    }

    /// Tombstone a row and its live dependents under one shared timestamp.
    /// Returns the row and the number of dependents tombstoned with it.
    pub async fn soft_delete_cascade(
        &self,
        entity: SoftDeletable,
        id: Uuid,
    ) -> Result<Option<(Row, u64)>> {
        let changes = Changes::new().set(DELETED_AT, Utc::now());
        let filter = Filter::by_id(id).merge(live());
        let Some(row) = self.store.update(entity.table(), &filter, &changes).await? else {
            return Ok(None);
        };

        let mut dependents = 0;
        for (child, parent_column) in entity.dependents() {
            let filter = Filter::new().eq(*parent_column, id).merge(live());
            dependents += self
                .store
                .update_many(child.table(), &filter, &changes)
                .await?;
        }
        Ok(Some((row, dependents)))
    }

    /// Restore a row and the dependents tombstoned in the same operation.
    /// Dependents deleted on their own at another time stay tombstoned.
    pub async fn restore_cascade(
        &self,
        entity: SoftDeletable,
        id: Uuid,
    ) -> Result<Option<(Row, u64)>> {
        let filter = Filter::by_id(id).merge(tombstoned());
        let Some(tombstone) = self.store.find_first(entity.table(), &filter).await? else {
            return Ok(None);
        };
        let deleted_at: DateTime<Utc> = decode(tombstone[DELETED_AT].clone())?;

        let Some(row) = self.restore(entity, id).await? else {
            return Ok(None);
        };

        let changes = Changes::new().set(DELETED_AT, FieldValue::Null);
        let mut dependents = 0;
        for (child, parent_column) in entity.dependents() {
            let filter = Filter::new()
                .eq(*parent_column, id)
                .eq(DELETED_AT, deleted_at);
            dependents += self
                .store
                .update_many(child.table(), &filter, &changes)
                .await?;
        }
        Ok(Some((row, dependents)))
    }

    /// TOMBSTONED -> PURGED. A live row is never purged.
    pub async fn hard_delete(&self, entity: SoftDeletable, id: Uuid) -> Result<bool> {
        let filter = Filter::by_id(id).merge(tombstoned());
        Ok(self.store.delete_many(entity.table(), &filter).await? > 0)
    }

    pub async fn find_deleted(
        &self,
        entity: SoftDeletable,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Row>> {
        let filter = filter.clone().merge(tombstoned());
        self.store.find_many(entity.table(), &filter, options).await
    }

    pub async fn count_deleted(&self, entity: SoftDeletable, filter: &Filter) -> Result<i64> {
        let filter = filter.clone().merge(tombstoned());
        self.store.count(entity.table(), &filter).await
    }

    /// Purge rows tombstoned strictly more than `days_old` days ago. A cutoff
    /// before the representable time range matches nothing.
    pub async fn cleanup_old_deleted(&self, entity: SoftDeletable, days_old: i64) -> Result<u64> {
        let Some(cutoff) =
            TimeDelta::try_days(days_old).and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return Ok(0);
        };
        let filter = Filter::new().with(DELETED_AT, Condition::Lt(cutoff.into()));
        self.store.delete_many(entity.table(), &filter).await
    }
}
