use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::relations::dtos::{
    CreateRelationDto, CreateRelationTypeDto, RelationResponseDto, RelationTypeResponseDto,
};
use crate::features::relations::models::{Relation, RelationType};
use crate::modules::persistence::{
    decode, decode_all, Changes, Condition, FieldValue, Filter, FindOptions, SoftDeleteGuard,
    SortDirection, Table, ID,
};

fn any_of(ids: impl IntoIterator<Item = Uuid>) -> Condition {
    Condition::In(ids.into_iter().map(FieldValue::from).collect())
}

/// Relation types and the directed relations between characters
pub struct RelationService {
    guard: SoftDeleteGuard,
}

impl RelationService {
    pub fn new(guard: SoftDeleteGuard) -> Self {
        Self { guard }
    }

    pub async fn list_types(&self) -> Result<Vec<RelationTypeResponseDto>> {
        let rows = self
            .guard
            .find_many(
                Table::RelationTypes,
                &Filter::new(),
                &FindOptions::new().order_by("name", SortDirection::Asc),
            )
            .await?;
        let types: Vec<RelationType> = decode_all(rows)?;
        Ok(types.into_iter().map(Into::into).collect())
    }

    pub async fn create_type(&self, dto: CreateRelationTypeDto) -> Result<RelationTypeResponseDto> {
        let name = dto.name.trim().to_string();
        let existing = self
            .guard
            .find_first(Table::RelationTypes, &Filter::new().eq("name", name.as_str()))
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Relation type '{}' already exists",
                name
            )));
        }

        let values = Changes::new()
            .set("name", name)
            .set("description", dto.description);
        let relation_type: RelationType =
            decode(self.guard.create(Table::RelationTypes, &values).await?)?;
        Ok(relation_type.into())
    }

    async fn find_type(&self, id: Uuid) -> Result<RelationType> {
        let row = self
            .guard
            .find_unique(Table::RelationTypes, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Relation type {} not found", id)))?;
        decode(row)
    }

    async fn ensure_character(&self, id: Uuid) -> Result<()> {
        self.guard
            .find_unique(Table::Characters, id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Character {} not found", id)))
    }

    pub async fn create(&self, dto: CreateRelationDto) -> Result<RelationResponseDto> {
        if dto.source_character_id == dto.target_character_id {
            return Err(AppError::BadRequest(
                "A character cannot be related to itself".to_string(),
            ));
        }

        let relation_type = self.find_type(dto.relation_type_id).await?;
        self.ensure_character(dto.source_character_id).await?;
        self.ensure_character(dto.target_character_id).await?;

        let triple = Filter::new()
            .eq("source_character_id", dto.source_character_id)
            .eq("target_character_id", dto.target_character_id)
            .eq("relation_type_id", dto.relation_type_id);
        if self.guard.find_first(Table::Relations, &triple).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Relation '{}' between these characters already exists",
                relation_type.name
            )));
        }

        let values = Changes::new()
            .set("source_character_id", dto.source_character_id)
            .set("target_character_id", dto.target_character_id)
            .set("relation_type_id", dto.relation_type_id);
        let relation: Relation = decode(self.guard.create(Table::Relations, &values).await?)?;

        tracing::info!(
            relation_id = %relation.id,
            relation_type = %relation_type.name,
            "Relation created"
        );
        Ok(RelationResponseDto::new(relation, relation_type.into()))
    }

    /// Relations in either direction whose other end is still a live character
    pub async fn list_for_character(&self, character_id: Uuid) -> Result<Vec<RelationResponseDto>> {
        self.ensure_character(character_id).await?;

        let options = FindOptions::new().order_by("created_at", SortDirection::Asc);
        let outgoing = self
            .guard
            .find_many(
                Table::Relations,
                &Filter::new().eq("source_character_id", character_id),
                &options,
            )
            .await?;
        let incoming = self
            .guard
            .find_many(
                Table::Relations,
                &Filter::new().eq("target_character_id", character_id),
                &options,
            )
            .await?;

        let mut relations: Vec<Relation> = decode_all(outgoing)?;
        relations.extend(decode_all::<Relation>(incoming)?);
        relations.sort_by_key(|r| r.created_at);
        if relations.is_empty() {
            return Ok(Vec::new());
        }

        let other_ends: HashSet<Uuid> = relations
            .iter()
            .map(|r| {
                if r.source_character_id == character_id {
                    r.target_character_id
                } else {
                    r.source_character_id
                }
            })
            .collect();
        let live_rows = self
            .guard
            .find_many(
                Table::Characters,
                &Filter::new().with(ID, any_of(other_ends)),
                &FindOptions::new(),
            )
            .await?;
        let live: HashSet<Uuid> = live_rows
            .into_iter()
            .filter_map(|row| row.get(ID).cloned())
            .map(decode::<Uuid>)
            .collect::<Result<_>>()?;

        let type_ids: HashSet<Uuid> = relations.iter().map(|r| r.relation_type_id).collect();
        let type_rows = self
            .guard
            .find_many(
                Table::RelationTypes,
                &Filter::new().with(ID, any_of(type_ids)),
                &FindOptions::new(),
            )
            .await?;
        let types: HashMap<Uuid, RelationType> = decode_all::<RelationType>(type_rows)?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let visible = |id: &Uuid| *id == character_id || live.contains(id);
        Ok(relations
            .into_iter()
            .filter(|r| visible(&r.source_character_id) && visible(&r.target_character_id))
            .filter_map(|r| {
                let relation_type = types.get(&r.relation_type_id)?.clone();
                Some(RelationResponseDto::new(r, relation_type.into()))
            })
            .collect())
    }

    /// Relations are removed outright; they carry no tombstone
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let removed = self
            .guard
            .delete_many(Table::Relations, &Filter::by_id(id))
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound(format!("Relation {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persistence::SoftDeletable;
    use crate::shared::test_helpers::MemoryStore;
    use std::sync::Arc;

    struct Fixture {
        guard: SoftDeleteGuard,
        service: RelationService,
    }

    fn fixture() -> Fixture {
        let guard = SoftDeleteGuard::new(Arc::new(MemoryStore::new()));
        Fixture {
            service: RelationService::new(guard.clone()),
            guard,
        }
    }

    async fn character(guard: &SoftDeleteGuard, name: &str) -> Uuid {
        let row = guard
            .create(Table::Characters, &Changes::new().set("name", name))
            .await
            .unwrap();
        decode(row["id"].clone()).unwrap()
    }

    async fn relation_type(service: &RelationService, name: &str) -> Uuid {
        service
            .create_type(CreateRelationTypeDto {
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id
    }

    fn relation(source: Uuid, target: Uuid, relation_type_id: Uuid) -> CreateRelationDto {
        CreateRelationDto {
            source_character_id: source,
            target_character_id: target,
            relation_type_id,
        }
    }

    #[tokio::test]
    async fn test_duplicate_type_name_is_conflict() {
        let f = fixture();
        relation_type(&f.service, "sibling").await;

        let again = f
            .service
            .create_type(CreateRelationTypeDto {
                name: " sibling ".to_string(),
                description: None,
            })
            .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_relation_rules() {
        let f = fixture();
        let aria = character(&f.guard, "Aria").await;
        let kai = character(&f.guard, "Kai").await;
        let rival = relation_type(&f.service, "rival").await;

        assert!(matches!(
            f.service.create(relation(aria, aria, rival)).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            f.service.create(relation(aria, kai, Uuid::new_v4())).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.service.create(relation(aria, Uuid::new_v4(), rival)).await,
            Err(AppError::NotFound(_))
        ));

        let created = f.service.create(relation(aria, kai, rival)).await.unwrap();
        assert_eq!(created.relation_type.name, "rival");
        assert!(matches!(
            f.service.create(relation(aria, kai, rival)).await,
            Err(AppError::Conflict(_))
        ));
        f.service.create(relation(kai, aria, rival)).await.unwrap();
    }

    #[tokio::test]
    async fn test_listing_covers_both_directions_and_hides_tombstoned_characters() {
        let f = fixture();
        let aria = character(&f.guard, "Aria").await;
        let kai = character(&f.guard, "Kai").await;
        let mo = character(&f.guard, "Mo").await;
        let friend = relation_type(&f.service, "friend").await;

        f.service.create(relation(aria, kai, friend)).await.unwrap();
        f.service.create(relation(mo, aria, friend)).await.unwrap();
        assert_eq!(f.service.list_for_character(aria).await.unwrap().len(), 2);

        f.guard
            .admin()
            .soft_delete(SoftDeletable::Character, mo)
            .await
            .unwrap();
        let relations = f.service.list_for_character(aria).await.unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].target_character_id, kai);
    }

    #[tokio::test]
    async fn test_delete_is_physical() {
        let f = fixture();
        let aria = character(&f.guard, "Aria").await;
        let kai = character(&f.guard, "Kai").await;
        let friend = relation_type(&f.service, "friend").await;
        let created = f.service.create(relation(aria, kai, friend)).await.unwrap();

        f.service.delete(created.id).await.unwrap();
        assert!(matches!(
            f.service.delete(created.id).await,
            Err(AppError::NotFound(_))
        ));
        f.service.create(relation(aria, kai, friend)).await.unwrap();
    }
}
