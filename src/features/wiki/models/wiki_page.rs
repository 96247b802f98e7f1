use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Row model for `wiki_pages`
#[derive(Debug, Clone, Deserialize)]
pub struct WikiPage {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub character_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
