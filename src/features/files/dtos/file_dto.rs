use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::storage::{format_file_size, DiskUsage, FileDescriptor, SubfolderUsage};

/// Upload form for OpenAPI documentation.
/// The handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFilesDto {
    /// One or more files (repeat the field)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
    /// Optional single-segment subfolder under the upload root
    #[schema(example = "avatars")]
    pub subfolder: Option<String>,
    /// Validate every file as this class instead of classifying by MIME
    #[schema(example = "IMAGE")]
    pub content_type: Option<String>,
}

/// A file that failed validation or could not be stored
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RejectedFileDto {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResultDto {
    pub files: Vec<FileDescriptor>,
    pub rejected: Vec<RejectedFileDto>,
}

/// Request DTO for deleting a file by URL
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteFileByUrlDto {
    /// Public URL as returned by upload, e.g. `/uploads/avatars/x_<uuid>.png`
    #[validate(length(min = 1, message = "url is required"))]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiskUsageDto {
    pub total_files: u64,
    pub total_size: u64,
    /// Human-readable total, e.g. "1.5 MB"
    pub total_size_formatted: String,
    pub by_subfolder: BTreeMap<String, SubfolderUsage>,
}

impl From<DiskUsage> for DiskUsageDto {
    fn from(usage: DiskUsage) -> Self {
        Self {
            total_files: usage.total_files,
            total_size: usage.total_size,
            total_size_formatted: format_file_size(usage.total_size),
            by_subfolder: usage.by_subfolder,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrphanCleanupDto {
    /// Number of unreferenced files removed from disk
    pub deleted: usize,
}
