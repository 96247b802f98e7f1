use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    DeleteFileByUrlDto, DeleteFileResponseDto, DiskUsageDto, OrphanCleanupDto, UploadFilesDto,
    UploadResultDto,
};
use crate::features::files::handlers::UploadForm;
use crate::features::files::services::FileService;
use crate::shared::types::ApiResponse;

/// Upload one or more files
///
/// Accepts multipart/form-data with:
/// - `files`: one or more files (repeat the field)
/// - `subfolder`: optional folder under the upload root
/// - `contentType`: optional IMAGE, VIDEO or OTHER; defaults to each file's MIME class
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = UploadFilesDto,
        content_type = "multipart/form-data",
        description = "Files plus optional subfolder and contentType",
    ),
    responses(
        (status = 201, description = "At least one file stored", body = ApiResponse<UploadResultDto>),
        (status = 400, description = "Invalid form, extension, or every file rejected"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large"),
        (status = 415, description = "MIME type not allowed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResultDto>>)> {
    let form = UploadForm::read(&mut multipart).await?;
    let content_type = form.content_type()?;
    let subfolder = form.field("subfolder").map(str::to_string);
    tracing::debug!(uploaded_by = %user.sub, files = form.files.len(), "Upload received");

    let result = service
        .upload(form.files, subfolder.as_deref(), content_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(result), None, None)),
    ))
}

/// Delete a stored file by its public URL (admin only)
///
/// Removes the bytes whether or not a live record still points at them.
#[utoipa::path(
    delete,
    path = "/api/files",
    tag = "files",
    request_body = DeleteFileByUrlDto,
    responses(
        (status = 200, description = "Whether a file was removed", body = ApiResponse<DeleteFileResponseDto>),
        (status = 400, description = "Invalid URL"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin role required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file_by_url(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<FileService>>,
    AppJson(dto): AppJson<DeleteFileByUrlDto>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let deleted = service.delete_by_url(&dto.url).await;
    tracing::info!(admin = %user.sub, url = %dto.url, deleted, "File deleted by URL");

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted }),
        None,
        None,
    )))
}

/// Serve a stored file
#[utoipa::path(
    get,
    path = "/uploads/{path}",
    tag = "files",
    params(
        ("path" = String, Path, description = "Path relative to the upload root")
    ),
    responses(
        (status = 200, description = "File contents"),
        (status = 400, description = "Unsafe path"),
        (status = 404, description = "File not found")
    )
)]
pub async fn serve_file(
    State(service): State<Arc<FileService>>,
    Path(path): Path<String>,
) -> Result<Response> {
    let file = service.read(&path).await?;
    Ok(([(header::CONTENT_TYPE, file.mime_type)], file.data).into_response())
}

/// Disk usage of the upload root
#[utoipa::path(
    get,
    path = "/api/admin/uploads/usage",
    tag = "admin",
    responses(
        (status = 200, description = "Usage totals and per-subfolder breakdown", body = ApiResponse<DiskUsageDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn disk_usage(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<DiskUsageDto>>> {
    let usage = service.disk_usage().await?;
    Ok(Json(ApiResponse::success(Some(usage), None, None)))
}

/// Delete stored files no live record references
#[utoipa::path(
    post,
    path = "/api/admin/uploads/cleanup",
    tag = "admin",
    responses(
        (status = 200, description = "Number of orphaned files removed", body = ApiResponse<OrphanCleanupDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn cleanup_orphans(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<OrphanCleanupDto>>> {
    tracing::info!(admin = %user.sub, "Orphaned upload sweep requested");
    let result = service.cleanup_orphans().await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}
