use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Row model for `relation_types`
#[derive(Debug, Clone, Deserialize)]
pub struct RelationType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row model for `relations`, a directed edge between two characters
#[derive(Debug, Clone, Deserialize)]
pub struct Relation {
    pub id: Uuid,
    pub source_character_id: Uuid,
    pub target_character_id: Uuid,
    pub relation_type_id: Uuid,
    pub created_at: DateTime<Utc>,
}
