use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::dtos::RejectedFileDto;
use crate::features::resources::models::{Resource, ResourceFile};
use crate::modules::storage::{ContentType, ImageDimensions};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::PaginationQuery;

/// Multipart form for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateResourceFormDto {
    pub name: String,
    pub description: Option<String>,
    pub character_id: Option<Uuid>,
    /// Zero or more files (repeat the field)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
}

/// Multipart form for attaching files, for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct AttachFilesFormDto {
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
}

/// Scalar fields of the create form, validated before any file is stored
#[derive(Debug, Validate)]
pub struct CreateResourceDto {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: Option<String>,
    pub character_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceDto {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: Option<String>,
    pub character_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesQuery {
    /// Page number (1-indexed, default: 1)
    pub page: Option<i64>,
    /// Number of items per page (default: 10, max: 100)
    #[serde(alias = "page_size")]
    pub page_size: Option<i64>,
    /// Only resources attached to this character
    pub character_id: Option<Uuid>,
}

impl ListResourcesQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFileDto {
    pub id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub mime_type: String,
    pub file_size: i64,
    pub content_type: ContentType,
    pub metadata: Option<ImageDimensions>,
    pub created_at: DateTime<Utc>,
}

impl From<ResourceFile> for ResourceFileDto {
    fn from(f: ResourceFile) -> Self {
        let metadata = match (f.width, f.height) {
            (Some(width), Some(height)) => Some(ImageDimensions {
                width: u32::try_from(width).unwrap_or_default(),
                height: u32::try_from(height).unwrap_or_default(),
            }),
            _ => None,
        };
        Self {
            id: f.id,
            file_name: f.file_name,
            file_url: f.file_url,
            mime_type: f.mime_type,
            file_size: f.file_size,
            content_type: f.content_type,
            metadata,
            created_at: f.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub character_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Resource> for ResourceResponseDto {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            character_id: r.character_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A resource with its live files
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDetailDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub character_id: Option<Uuid>,
    pub files: Vec<ResourceFileDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceDetailDto {
    pub fn new(resource: Resource, files: Vec<ResourceFileDto>) -> Self {
        Self {
            id: resource.id,
            name: resource.name,
            description: resource.description,
            character_id: resource.character_id,
            files,
            created_at: resource.created_at,
            updated_at: resource.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceResultDto {
    pub resource: ResourceDetailDto,
    pub rejected: Vec<RejectedFileDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachFilesResultDto {
    pub files: Vec<ResourceFileDto>,
    pub rejected: Vec<RejectedFileDto>,
}
