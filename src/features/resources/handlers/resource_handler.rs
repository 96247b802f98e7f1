use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::files::handlers::UploadForm;
use crate::features::resources::dtos::{
    AttachFilesFormDto, AttachFilesResultDto, CreateResourceDto, CreateResourceFormDto,
    CreateResourceResultDto, ListResourcesQuery, ResourceDetailDto, ResourceResponseDto,
    UpdateResourceDto,
};
use crate::features::resources::services::ResourceService;
use crate::shared::types::ApiResponse;

fn parse_character_id(form: &UploadForm) -> Result<Option<Uuid>> {
    form.field("characterId")
        .map(|raw| {
            Uuid::parse_str(raw)
                .map_err(|_| AppError::BadRequest(format!("Invalid characterId '{}'", raw)))
        })
        .transpose()
}

/// Create a resource from a multipart form
///
/// Scalar fields are validated before any file is written. Files that fail
/// validation are reported in `rejected`; the resource is still created.
#[utoipa::path(
    post,
    path = "/api/resources",
    request_body(
        content = CreateResourceFormDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Resource created", body = ApiResponse<CreateResourceResultDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Character not found")
    ),
    tag = "resources",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_resource(
    State(service): State<Arc<ResourceService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<CreateResourceResultDto>>)> {
    let form = UploadForm::read(&mut multipart).await?;
    let dto = CreateResourceDto {
        name: form.field("name").unwrap_or_default().to_string(),
        description: form.field("description").map(str::to_string),
        character_id: parse_character_id(&form)?,
    };
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = service.create(dto, form.files).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(result),
            Some("Resource created".to_string()),
            None,
        )),
    ))
}

/// List live resources, newest first
#[utoipa::path(
    get,
    path = "/api/resources",
    params(ListResourcesQuery),
    responses(
        (status = 200, description = "List of resources", body = ApiResponse<Vec<ResourceResponseDto>>)
    ),
    tag = "resources",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_resources(
    State(service): State<Arc<ResourceService>>,
    AppQuery(query): AppQuery<ListResourcesQuery>,
) -> Result<Json<ApiResponse<Vec<ResourceResponseDto>>>> {
    let pagination = query.pagination();
    let (items, total) = service
        .list(pagination.offset(), pagination.limit(), query.character_id)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(pagination.meta(total)),
    )))
}

/// Get a resource with its live files
#[utoipa::path(
    get,
    path = "/api/resources/{id}",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Resource found", body = ApiResponse<ResourceDetailDto>),
        (status = 404, description = "Resource not found")
    ),
    tag = "resources",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_resource(
    State(service): State<Arc<ResourceService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ResourceDetailDto>>> {
    let resource = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(resource), None, None)))
}

#[utoipa::path(
    patch,
    path = "/api/resources/{id}",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    request_body = UpdateResourceDto,
    responses(
        (status = 200, description = "Resource updated", body = ApiResponse<ResourceDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Resource or character not found")
    ),
    tag = "resources",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_resource(
    State(service): State<Arc<ResourceService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateResourceDto>,
) -> Result<Json<ApiResponse<ResourceDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let resource = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(resource), None, None)))
}

/// Move a resource and its files to the trash
#[utoipa::path(
    delete,
    path = "/api/resources/{id}",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Resource deleted"),
        (status = 404, description = "Resource not found")
    ),
    tag = "resources",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_resource(
    State(service): State<Arc<ResourceService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Resource deleted".to_string()),
        None,
    )))
}

/// Attach more files to a resource
#[utoipa::path(
    post,
    path = "/api/resources/{id}/files",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    request_body(
        content = AttachFilesFormDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Files attached", body = ApiResponse<AttachFilesResultDto>),
        (status = 400, description = "No file provided or every file rejected"),
        (status = 404, description = "Resource not found"),
        (status = 413, description = "File too large"),
        (status = 415, description = "MIME type not allowed")
    ),
    tag = "resources",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn attach_files(
    State(service): State<Arc<ResourceService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AttachFilesResultDto>>)> {
    let form = UploadForm::read(&mut multipart).await?;
    let result = service.attach_files(id, form.files).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(result), None, None)),
    ))
}

/// Move one file of a resource to the trash
#[utoipa::path(
    delete,
    path = "/api/resources/{id}/files/{file_id}",
    params(
        ("id" = Uuid, Path, description = "Resource ID"),
        ("file_id" = Uuid, Path, description = "Resource file ID")
    ),
    responses(
        (status = 200, description = "File deleted"),
        (status = 404, description = "Resource or file not found")
    ),
    tag = "resources",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_resource_file(
    State(service): State<Arc<ResourceService>>,
    Path((id, file_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_file(id, file_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("File deleted".to_string()),
        None,
    )))
}
