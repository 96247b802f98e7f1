use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::characters::dtos::{
    CharacterResponseDto, CreateCharacterDto, UpdateCharacterDto,
};
use crate::features::characters::services::CharacterService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// List live characters (paginated, by name)
#[utoipa::path(
    get,
    path = "/api/characters",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of characters", body = ApiResponse<Vec<CharacterResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "characters",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_characters(
    State(service): State<Arc<CharacterService>>,
    AppQuery(params): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<CharacterResponseDto>>>> {
    let (items, total) = service.list(params.offset(), params.limit()).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(params.meta(total)),
    )))
}

/// Create a character
#[utoipa::path(
    post,
    path = "/api/characters",
    request_body = CreateCharacterDto,
    responses(
        (status = 201, description = "Character created", body = ApiResponse<CharacterResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "characters",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_character(
    State(service): State<Arc<CharacterService>>,
    AppJson(dto): AppJson<CreateCharacterDto>,
) -> Result<(StatusCode, Json<ApiResponse<CharacterResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let character = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(character),
            Some("Character created".to_string()),
            None,
        )),
    ))
}

/// Get a character by ID
#[utoipa::path(
    get,
    path = "/api/characters/{id}",
    params(
        ("id" = Uuid, Path, description = "Character ID")
    ),
    responses(
        (status = 200, description = "Character found", body = ApiResponse<CharacterResponseDto>),
        (status = 404, description = "Character not found")
    ),
    tag = "characters",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_character(
    State(service): State<Arc<CharacterService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CharacterResponseDto>>> {
    let character = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(character), None, None)))
}

/// Update a character
#[utoipa::path(
    patch,
    path = "/api/characters/{id}",
    params(
        ("id" = Uuid, Path, description = "Character ID")
    ),
    request_body = UpdateCharacterDto,
    responses(
        (status = 200, description = "Character updated", body = ApiResponse<CharacterResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Character not found")
    ),
    tag = "characters",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_character(
    State(service): State<Arc<CharacterService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCharacterDto>,
) -> Result<Json<ApiResponse<CharacterResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let character = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(character), None, None)))
}

/// Move a character to the trash
#[utoipa::path(
    delete,
    path = "/api/characters/{id}",
    params(
        ("id" = Uuid, Path, description = "Character ID")
    ),
    responses(
        (status = 200, description = "Character deleted"),
        (status = 404, description = "Character not found")
    ),
    tag = "characters",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_character(
    State(service): State<Arc<CharacterService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Character deleted".to_string()),
        None,
    )))
}
