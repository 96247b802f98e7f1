use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::modules::persistence::{decode, Row, SoftDeletable, DELETED_AT, ID};
use crate::shared::constants::DEFAULT_RETENTION_DAYS;

/// A tombstoned row as listed in the trash
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrashEntryDto {
    pub entity: SoftDeletable,
    pub id: Uuid,
    pub deleted_at: DateTime<Utc>,
    /// The full row, snake_case columns as stored
    pub record: Value,
}

impl TrashEntryDto {
    pub fn from_row(entity: SoftDeletable, row: Row) -> Result<Self> {
        let column = |name: &str| {
            row.get(name)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("Trash row is missing '{}'", name)))
        };
        Ok(Self {
            entity,
            id: decode(column(ID)?)?,
            deleted_at: decode(column(DELETED_AT)?)?,
            record: row,
        })
    }
}

/// A row brought back from the trash
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoredEntryDto {
    pub entity: SoftDeletable,
    pub id: Uuid,
    pub record: Value,
    /// Dependent rows restored with it, e.g. a resource's files
    pub dependents: u64,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PurgeQuery {
    /// Purge rows tombstoned more than this many days ago (default: 30)
    #[serde(default = "default_days_old")]
    pub days_old: i64,
}

fn default_days_old() -> i64 {
    DEFAULT_RETENTION_DAYS
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResultDto {
    pub purged: u64,
}
