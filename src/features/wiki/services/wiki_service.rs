use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::wiki::dtos::{CreateWikiPageDto, UpdateWikiPageDto, WikiPageResponseDto};
use crate::features::wiki::models::WikiPage;
use crate::modules::persistence::{
    decode, decode_all, Changes, Filter, FindOptions, SoftDeletable, SoftDeleteGuard,
    SortDirection, Table,
};

pub struct WikiService {
    guard: SoftDeleteGuard,
}

impl WikiService {
    pub fn new(guard: SoftDeleteGuard) -> Self {
        Self { guard }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<WikiPage> {
        let row = self
            .guard
            .find_first(Table::WikiPages, &Filter::new().eq("slug", slug))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wiki page '{}' not found", slug)))?;
        decode(row)
    }

    /// Tombstoned pages keep their slug until purged
    async fn ensure_slug_free(&self, slug: &str) -> Result<()> {
        let taken = self
            .guard
            .exists_including_deleted(Table::WikiPages, &Filter::new().eq("slug", slug))
            .await?;
        if taken {
            return Err(AppError::Conflict(format!(
                "Wiki page with slug '{}' already exists",
                slug
            )));
        }
        Ok(())
    }

    async fn ensure_character(&self, character_id: Uuid) -> Result<()> {
        self.guard
            .find_unique(Table::Characters, character_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Character {} not found", character_id)))
    }

    pub async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<WikiPageResponseDto>, i64)> {
        let options = FindOptions::new()
            .order_by("title", SortDirection::Asc)
            .paginate(offset, limit);
        let rows = self
            .guard
            .find_many(Table::WikiPages, &Filter::new(), &options)
            .await?;
        let total = self.guard.count(Table::WikiPages, &Filter::new()).await?;

        let pages: Vec<WikiPage> = decode_all(rows)?;
        Ok((pages.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, slug: &str) -> Result<WikiPageResponseDto> {
        Ok(self.find_by_slug(slug).await?.into())
    }

    pub async fn create(&self, dto: CreateWikiPageDto) -> Result<WikiPageResponseDto> {
        self.ensure_slug_free(&dto.slug).await?;
        if let Some(character_id) = dto.character_id {
            self.ensure_character(character_id).await?;
        }

        let values = Changes::new()
            .set("slug", dto.slug)
            .set("title", dto.title.trim())
            .set("content", dto.content)
            .set("character_id", dto.character_id);
        let page: WikiPage = decode(self.guard.create(Table::WikiPages, &values).await?)?;

        tracing::info!(slug = %page.slug, "Wiki page created");
        Ok(page.into())
    }

    pub async fn update(&self, slug: &str, dto: UpdateWikiPageDto) -> Result<WikiPageResponseDto> {
        let page = self.find_by_slug(slug).await?;

        let new_slug = dto.slug.filter(|s| s != &page.slug);
        if let Some(new_slug) = &new_slug {
            self.ensure_slug_free(new_slug).await?;
        }
        if let Some(character_id) = dto.character_id {
            self.ensure_character(character_id).await?;
        }

        let changes = Changes::new()
            .set_some("slug", new_slug)
            .set_some("title", dto.title.map(|t| t.trim().to_string()))
            .set_some("content", dto.content)
            .set_some("character_id", dto.character_id);

        let row = self
            .guard
            .update(Table::WikiPages, &Filter::by_id(page.id), &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wiki page '{}' not found", slug)))?;
        Ok(decode::<WikiPage>(row)?.into())
    }

    pub async fn delete(&self, slug: &str) -> Result<()> {
        let page = self.find_by_slug(slug).await?;
        self.guard
            .admin()
            .soft_delete(SoftDeletable::WikiPage, page.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wiki page '{}' not found", slug)))?;
        tracing::info!(slug = %slug, "Wiki page moved to trash");
        Ok(())
    }
}
