use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::relations::dtos::{
    CreateRelationDto, CreateRelationTypeDto, RelationResponseDto, RelationTypeResponseDto,
};
use crate::features::relations::services::RelationService;
use crate::shared::types::ApiResponse;

#[utoipa::path(
    get,
    path = "/api/relation-types",
    responses(
        (status = 200, description = "All relation types, by name", body = ApiResponse<Vec<RelationTypeResponseDto>>)
    ),
    tag = "relations",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_relation_types(
    State(service): State<Arc<RelationService>>,
) -> Result<Json<ApiResponse<Vec<RelationTypeResponseDto>>>> {
    let types = service.list_types().await?;
    Ok(Json(ApiResponse::success(Some(types), None, None)))
}

/// Create a relation type (admin only)
#[utoipa::path(
    post,
    path = "/api/relation-types",
    request_body = CreateRelationTypeDto,
    responses(
        (status = 201, description = "Relation type created", body = ApiResponse<RelationTypeResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 409, description = "Name already taken")
    ),
    tag = "relations",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_relation_type(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<RelationService>>,
    AppJson(dto): AppJson<CreateRelationTypeDto>,
) -> Result<(StatusCode, Json<ApiResponse<RelationTypeResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let relation_type = service.create_type(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(relation_type), None, None)),
    ))
}

/// Relations of a character, in either direction
#[utoipa::path(
    get,
    path = "/api/characters/{id}/relations",
    params(
        ("id" = Uuid, Path, description = "Character ID")
    ),
    responses(
        (status = 200, description = "Relations of the character", body = ApiResponse<Vec<RelationResponseDto>>),
        (status = 404, description = "Character not found")
    ),
    tag = "relations",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_character_relations(
    State(service): State<Arc<RelationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<RelationResponseDto>>>> {
    let relations = service.list_for_character(id).await?;
    Ok(Json(ApiResponse::success(Some(relations), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/relations",
    request_body = CreateRelationDto,
    responses(
        (status = 201, description = "Relation created", body = ApiResponse<RelationResponseDto>),
        (status = 400, description = "Self relation"),
        (status = 404, description = "Character or relation type not found"),
        (status = 409, description = "Relation already exists")
    ),
    tag = "relations",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_relation(
    State(service): State<Arc<RelationService>>,
    AppJson(dto): AppJson<CreateRelationDto>,
) -> Result<(StatusCode, Json<ApiResponse<RelationResponseDto>>)> {
    let relation = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(relation), None, None)),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/relations/{id}",
    params(
        ("id" = Uuid, Path, description = "Relation ID")
    ),
    responses(
        (status = 200, description = "Relation deleted"),
        (status = 404, description = "Relation not found")
    ),
    tag = "relations",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_relation(
    State(service): State<Arc<RelationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Relation deleted".to_string()),
        None,
    )))
}
