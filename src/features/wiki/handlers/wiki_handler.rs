use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::wiki::dtos::{CreateWikiPageDto, UpdateWikiPageDto, WikiPageResponseDto};
use crate::features::wiki::services::WikiService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// List live wiki pages (paginated, by title)
#[utoipa::path(
    get,
    path = "/api/wiki",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of wiki pages", body = ApiResponse<Vec<WikiPageResponseDto>>)
    ),
    tag = "wiki",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_pages(
    State(service): State<Arc<WikiService>>,
    AppQuery(params): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<WikiPageResponseDto>>>> {
    let (items, total) = service.list(params.offset(), params.limit()).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(params.meta(total)),
    )))
}

#[utoipa::path(
    post,
    path = "/api/wiki",
    request_body = CreateWikiPageDto,
    responses(
        (status = 201, description = "Wiki page created", body = ApiResponse<WikiPageResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Slug already taken")
    ),
    tag = "wiki",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_page(
    State(service): State<Arc<WikiService>>,
    AppJson(dto): AppJson<CreateWikiPageDto>,
) -> Result<(StatusCode, Json<ApiResponse<WikiPageResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let page = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(page),
            Some("Wiki page created".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/wiki/{slug}",
    params(
        ("slug" = String, Path, description = "Page slug")
    ),
    responses(
        (status = 200, description = "Wiki page found", body = ApiResponse<WikiPageResponseDto>),
        (status = 404, description = "Wiki page not found")
    ),
    tag = "wiki",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_page(
    State(service): State<Arc<WikiService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<WikiPageResponseDto>>> {
    let page = service.get(&slug).await?;
    Ok(Json(ApiResponse::success(Some(page), None, None)))
}

#[utoipa::path(
    patch,
    path = "/api/wiki/{slug}",
    params(
        ("slug" = String, Path, description = "Page slug")
    ),
    request_body = UpdateWikiPageDto,
    responses(
        (status = 200, description = "Wiki page updated", body = ApiResponse<WikiPageResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Wiki page not found"),
        (status = 409, description = "Slug already taken")
    ),
    tag = "wiki",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_page(
    State(service): State<Arc<WikiService>>,
    Path(slug): Path<String>,
    AppJson(dto): AppJson<UpdateWikiPageDto>,
) -> Result<Json<ApiResponse<WikiPageResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let page = service.update(&slug, dto).await?;
    Ok(Json(ApiResponse::success(Some(page), None, None)))
}

/// Move a wiki page to the trash
#[utoipa::path(
    delete,
    path = "/api/wiki/{slug}",
    params(
        ("slug" = String, Path, description = "Page slug")
    ),
    responses(
        (status = 200, description = "Wiki page deleted"),
        (status = 404, description = "Wiki page not found")
    ),
    tag = "wiki",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_page(
    State(service): State<Arc<WikiService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&slug).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Wiki page deleted".to_string()),
        None,
    )))
}
