use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::relations::models::{Relation, RelationType};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRelationTypeDto {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationTypeResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RelationType> for RelationTypeResponseDto {
    fn from(t: RelationType) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRelationDto {
    pub source_character_id: Uuid,
    pub target_character_id: Uuid,
    pub relation_type_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationResponseDto {
    pub id: Uuid,
    pub source_character_id: Uuid,
    pub target_character_id: Uuid,
    pub relation_type: RelationTypeResponseDto,
    pub created_at: DateTime<Utc>,
}

impl RelationResponseDto {
    pub fn new(relation: Relation, relation_type: RelationTypeResponseDto) -> Self {
        Self {
            id: relation.id,
            source_character_id: relation.source_character_id,
            target_character_id: relation.target_character_id,
            relation_type,
            created_at: relation.created_at,
        }
    }
}
