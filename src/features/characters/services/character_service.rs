use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::characters::dtos::{
    CharacterResponseDto, CreateCharacterDto, UpdateCharacterDto,
};
use crate::features::characters::models::Character;
use crate::modules::persistence::{
    decode, decode_all, Changes, Filter, FindOptions, SoftDeletable, SoftDeleteGuard,
    SortDirection, Table,
};

pub struct CharacterService {
    guard: SoftDeleteGuard,
}

impl CharacterService {
    pub fn new(guard: SoftDeleteGuard) -> Self {
        Self { guard }
    }

    /// Load a live character
    pub async fn find(&self, id: Uuid) -> Result<Character> {
        let row = self
            .guard
            .find_unique(Table::Characters, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Character {} not found", id)))?;
        decode(row)
    }

    pub async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<CharacterResponseDto>, i64)> {
        let options = FindOptions::new()
            .order_by("name", SortDirection::Asc)
            .paginate(offset, limit);
        let rows = self
            .guard
            .find_many(Table::Characters, &Filter::new(), &options)
            .await?;
        let total = self.guard.count(Table::Characters, &Filter::new()).await?;

        let characters: Vec<Character> = decode_all(rows)?;
        Ok((characters.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, id: Uuid) -> Result<CharacterResponseDto> {
        Ok(self.find(id).await?.into())
    }

    pub async fn create(&self, dto: CreateCharacterDto) -> Result<CharacterResponseDto> {
        let values = Changes::new()
            .set("name", dto.name.trim())
            .set("description", dto.description)
            .set("avatar_url", dto.avatar_url);
        let row = self.guard.create(Table::Characters, &values).await?;

        let character: Character = decode(row)?;
        tracing::info!(character_id = %character.id, "Character created");
        Ok(character.into())
    }

    pub async fn update(&self, id: Uuid, dto: UpdateCharacterDto) -> Result<CharacterResponseDto> {
        let changes = Changes::new()
            .set_some("name", dto.name.map(|n| n.trim().to_string()))
            .set_some("description", dto.description)
            .set_some("avatar_url", dto.avatar_url);

        let row = self
            .guard
            .update(Table::Characters, &Filter::by_id(id), &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Character {} not found", id)))?;
        Ok(decode::<Character>(row)?.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.guard
            .admin()
            .soft_delete(SoftDeletable::Character, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Character {} not found", id)))?;
        tracing::info!(character_id = %id, "Character moved to trash");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::MemoryStore;
    use std::sync::Arc;

    fn service() -> CharacterService {
        CharacterService::new(SoftDeleteGuard::new(Arc::new(MemoryStore::new())))
    }

    fn create_dto(name: &str) -> CreateCharacterDto {
        CreateCharacterDto {
            name: name.to_string(),
            description: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_counts_live_rows() {
        let service = service();
        let mo = service.create(create_dto("Mo")).await.unwrap();
        service.create(create_dto("Aria")).await.unwrap();
        service.create(create_dto("Kai")).await.unwrap();
        service.delete(mo.id).await.unwrap();

        let (items, total) = service.list(0, 10).await.unwrap();
        assert_eq!(total, 2);
        let names: Vec<_> = items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Aria", "Kai"]);
    }

    #[tokio::test]
    async fn test_deleted_character_is_not_found_for_get_update_delete() {
        let service = service();
        let aria = service.create(create_dto("Aria")).await.unwrap();
        service.delete(aria.id).await.unwrap();

        assert!(matches!(service.get(aria.id).await, Err(AppError::NotFound(_))));
        let update = UpdateCharacterDto {
            name: Some("Renamed".to_string()),
            description: None,
            avatar_url: None,
        };
        assert!(matches!(
            service.update(aria.id, update).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.delete(aria.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_only_touches_given_fields() {
        let service = service();
        let created = service
            .create(CreateCharacterDto {
                name: "Aria".to_string(),
                description: Some("A bard".to_string()),
                avatar_url: None,
            })
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                UpdateCharacterDto {
                    name: Some("  Aria the Bold ".to_string()),
                    description: None,
                    avatar_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Aria the Bold");
        assert_eq!(updated.description.as_deref(), Some("A bard"));
    }
}
