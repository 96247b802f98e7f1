use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::admin::dtos::{PurgeQuery, PurgeResultDto, RestoredEntryDto, TrashEntryDto};
use crate::features::admin::services::TrashService;
use crate::features::auth::guards::RequireAdmin;
use crate::modules::persistence::SoftDeletable;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// List tombstoned rows of one entity (paginated, newest deletion first)
#[utoipa::path(
    get,
    path = "/api/admin/trash/{entity}",
    params(
        ("entity" = SoftDeletable, Path, description = "Soft-deletable entity"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Tombstoned rows", body = ApiResponse<Vec<TrashEntryDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_trash(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<TrashService>>,
    Path(entity): Path<SoftDeletable>,
    AppQuery(params): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<TrashEntryDto>>>> {
    let (items, total) = service
        .list(entity, params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(params.meta(total)),
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/trash/{entity}/{id}/restore",
    params(
        ("entity" = SoftDeletable, Path, description = "Soft-deletable entity"),
        ("id" = Uuid, Path, description = "Row ID")
    ),
    responses(
        (status = 200, description = "Row restored", body = ApiResponse<RestoredEntryDto>),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Row is not in trash")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn restore_entry(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<TrashService>>,
    Path((entity, id)): Path<(SoftDeletable, Uuid)>,
) -> Result<Json<ApiResponse<RestoredEntryDto>>> {
    tracing::debug!(admin = %user.sub, "Restore requested");
    let restored = service.restore(entity, id).await?;
    Ok(Json(ApiResponse::success(
        Some(restored),
        Some("Restored".to_string()),
        None,
    )))
}

/// Permanently delete one tombstoned row
#[utoipa::path(
    delete,
    path = "/api/admin/trash/{entity}/{id}",
    params(
        ("entity" = SoftDeletable, Path, description = "Soft-deletable entity"),
        ("id" = Uuid, Path, description = "Row ID")
    ),
    responses(
        (status = 200, description = "Row purged"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Row is not in trash")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn purge_entry(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<TrashService>>,
    Path((entity, id)): Path<(SoftDeletable, Uuid)>,
) -> Result<Json<ApiResponse<()>>> {
    tracing::debug!(admin = %user.sub, "Purge requested");
    service.purge(entity, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Purged".to_string()),
        None,
    )))
}

/// Purge rows of one entity tombstoned more than `daysOld` days ago
#[utoipa::path(
    post,
    path = "/api/admin/trash/{entity}/cleanup",
    params(
        ("entity" = SoftDeletable, Path, description = "Soft-deletable entity"),
        PurgeQuery
    ),
    responses(
        (status = 200, description = "Number of rows purged", body = ApiResponse<PurgeResultDto>),
        (status = 400, description = "daysOld out of range"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn cleanup_trash(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<TrashService>>,
    Path(entity): Path<SoftDeletable>,
    AppQuery(query): AppQuery<PurgeQuery>,
) -> Result<Json<ApiResponse<PurgeResultDto>>> {
    let result = service.cleanup(entity, query.days_old).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}
