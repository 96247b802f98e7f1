use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::wiki::models::WikiPage;
use crate::shared::validation::SLUG_REGEX;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWikiPageDto {
    /// Lowercase words separated by single hyphens, e.g. `aria-the-bard`
    #[validate(
        length(min = 1, max = 100),
        regex(path = *SLUG_REGEX, message = "slug must be lowercase alphanumeric segments separated by single hyphens")
    )]
    pub slug: String,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub character_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWikiPageDto {
    #[validate(
        length(min = 1, max = 100),
        regex(path = *SLUG_REGEX, message = "slug must be lowercase alphanumeric segments separated by single hyphens")
    )]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub character_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WikiPageResponseDto {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub character_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WikiPage> for WikiPageResponseDto {
    fn from(p: WikiPage) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            title: p.title,
            content: p.content,
            character_id: p.character_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
