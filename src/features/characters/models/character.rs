use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Row model for `characters`
#[derive(Debug, Clone, Deserialize)]
pub struct Character {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
