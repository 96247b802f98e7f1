use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::modules::storage::ContentType;

/// Row model for `resources`
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub character_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row model for `resource_files`: the persisted form of a stored upload
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceFile {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub mime_type: String,
    pub file_size: i64,
    pub content_type: ContentType,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub created_at: DateTime<Utc>,
}
