use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::services::FileService;
use crate::features::resources::dtos::{
    AttachFilesResultDto, CreateResourceDto, CreateResourceResultDto, ResourceDetailDto,
    ResourceFileDto, ResourceResponseDto, UpdateResourceDto,
};
use crate::features::resources::models::{Resource, ResourceFile};
use crate::modules::persistence::{
    decode, decode_all, Changes, Condition, FieldValue, Filter, FindOptions, SoftDeletable,
    SoftDeleteGuard, SortDirection, Table, ID,
};
use crate::modules::storage::{FileDescriptor, IncomingFile};

/// Upload subfolder for resource attachments
pub const RESOURCE_SUBFOLDER: &str = "resources";

/// Resources and their files: ingest, describe, persist
pub struct ResourceService {
    guard: SoftDeleteGuard,
    files: Arc<FileService>,
}

impl ResourceService {
    pub fn new(guard: SoftDeleteGuard, files: Arc<FileService>) -> Self {
        Self { guard, files }
    }

    async fn find(&self, id: Uuid) -> Result<Resource> {
        let row = self
            .guard
            .find_unique(Table::Resources, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", id)))?;
        decode(row)
    }

    async fn ensure_character(&self, character_id: Uuid) -> Result<()> {
        self.guard
            .find_unique(Table::Characters, character_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Character {} not found", character_id)))
    }

    async fn live_files(&self, resource_id: Uuid) -> Result<Vec<ResourceFileDto>> {
        let rows = self
            .guard
            .find_many(
                Table::ResourceFiles,
                &Filter::new().eq("resource_id", resource_id),
                &FindOptions::new().order_by("created_at", SortDirection::Asc),
            )
            .await?;
        let files: Vec<ResourceFile> = decode_all(rows)?;
        Ok(files.into_iter().map(Into::into).collect())
    }

    /// Record stored descriptors against a resource.
    ///
    /// If a row fails to persist, the rows already written by this call are
    /// tombstoned and the bytes of that descriptor and every one after it are
    /// discarded before the error is returned.
    async fn persist_files(
        &self,
        resource_id: Uuid,
        descriptors: Vec<FileDescriptor>,
    ) -> Result<Vec<ResourceFileDto>> {
        let mut persisted = Vec::with_capacity(descriptors.len());

        for (index, descriptor) in descriptors.iter().enumerate() {
            let (width, height) = match descriptor.metadata {
                Some(dims) => (Some(i64::from(dims.width)), Some(i64::from(dims.height))),
                None => (None, None),
            };
            let values = Changes::new()
                .set("resource_id", resource_id)
                .set("file_name", descriptor.file_name.as_str())
                .set("file_url", descriptor.file_url.as_str())
                .set("mime_type", descriptor.mime_type.as_str())
                .set("file_size", i64::try_from(descriptor.file_size).unwrap_or(i64::MAX))
                .set("content_type", descriptor.content_type.as_str())
                .set("width", width)
                .set("height", height);

            match self.guard.create(Table::ResourceFiles, &values).await {
                Ok(row) => persisted.push(decode::<ResourceFile>(row)?.into()),
                Err(e) => {
                    let discarded = self.files.discard(&descriptors[index..]).await;
                    let ids = persisted
                        .iter()
                        .map(|file: &ResourceFileDto| FieldValue::from(file.id))
                        .collect();
                    let tombstoned = self
                        .guard
                        .admin()
                        .soft_delete_many(
                            SoftDeletable::ResourceFile,
                            &Filter::new().with(ID, Condition::In(ids)),
                        )
                        .await?;
                    tracing::error!(
                        resource_id = %resource_id,
                        discarded,
                        tombstoned,
                        "Failed to record resource file: {}",
                        e
                    );
                    return Err(e);
                }
            }
        }

        Ok(persisted)
    }

    pub async fn create(
        &self,
        dto: CreateResourceDto,
        files: Vec<IncomingFile>,
    ) -> Result<CreateResourceResultDto> {
        if let Some(character_id) = dto.character_id {
            self.ensure_character(character_id).await?;
        }

        let outcome = self
            .files
            .ingest(files, Some(RESOURCE_SUBFOLDER), None)
            .await?;
        let rejected = outcome.rejected_dtos();

        let values = Changes::new()
            .set("name", dto.name.trim())
            .set("description", dto.description)
            .set("character_id", dto.character_id);
        let resource: Resource = match self.guard.create(Table::Resources, &values).await {
            Ok(row) => decode(row)?,
            Err(e) => {
                self.files.discard(&outcome.stored).await;
                return Err(e);
            }
        };

        let files = match self.persist_files(resource.id, outcome.stored).await {
            Ok(files) => files,
            Err(e) => {
                self.guard
                    .admin()
                    .soft_delete(SoftDeletable::Resource, resource.id)
                    .await?;
                return Err(e);
            }
        };
        tracing::info!(
            resource_id = %resource.id,
            files = files.len(),
            rejected = rejected.len(),
            "Resource created"
        );

        Ok(CreateResourceResultDto {
            resource: ResourceDetailDto::new(resource, files),
            rejected,
        })
    }

    pub async fn list(
        &self,
        offset: i64,
        limit: i64,
        character_id: Option<Uuid>,
    ) -> Result<(Vec<ResourceResponseDto>, i64)> {
        let filter = match character_id {
            Some(id) => Filter::new().eq("character_id", id),
            None => Filter::new(),
        };
        let options = FindOptions::new()
            .order_by("created_at", SortDirection::Desc)
            .paginate(offset, limit);

        let rows = self
            .guard
            .find_many(Table::Resources, &filter, &options)
            .await?;
        let total = self.guard.count(Table::Resources, &filter).await?;

        let resources: Vec<Resource> = decode_all(rows)?;
        Ok((resources.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, id: Uuid) -> Result<ResourceDetailDto> {
        let resource = self.find(id).await?;
        let files = self.live_files(id).await?;
        Ok(ResourceDetailDto::new(resource, files))
    }

    pub async fn update(&self, id: Uuid, dto: UpdateResourceDto) -> Result<ResourceDetailDto> {
        if let Some(character_id) = dto.character_id {
            self.ensure_character(character_id).await?;
        }

        let changes = Changes::new()
            .set_some("name", dto.name.map(|n| n.trim().to_string()))
            .set_some("description", dto.description)
            .set_some("character_id", dto.character_id);

        let row = self
            .guard
            .update(Table::Resources, &Filter::by_id(id), &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", id)))?;

        let files = self.live_files(id).await?;
        Ok(ResourceDetailDto::new(decode(row)?, files))
    }

    /// Tombstone the resource and its file records together so a trash
    /// restore brings both back. Stored bytes are left for the orphan sweep.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let (_, files) = self
            .guard
            .admin()
            .soft_delete_cascade(SoftDeletable::Resource, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", id)))?;
        tracing::info!(resource_id = %id, files, "Resource moved to trash");
        Ok(())
    }

    pub async fn attach_files(
        &self,
        id: Uuid,
        files: Vec<IncomingFile>,
    ) -> Result<AttachFilesResultDto> {
        self.find(id).await?;
        if files.is_empty() {
            return Err(AppError::BadRequest(
                "At least one file is required".to_string(),
            ));
        }

        let outcome = self
            .files
            .ingest(files, Some(RESOURCE_SUBFOLDER), None)
            .await?;
        if outcome.stored.is_empty() {
            return Err(outcome.into_rejection_error());
        }

        let rejected = outcome.rejected_dtos();
        let files = self.persist_files(id, outcome.stored).await?;
        Ok(AttachFilesResultDto { files, rejected })
    }

    pub async fn delete_file(&self, id: Uuid, file_id: Uuid) -> Result<()> {
        self.find(id).await?;

        let filter = Filter::by_id(file_id).eq("resource_id", id);
        self.guard
            .find_first(Table::ResourceFiles, &filter)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))?;

        self.guard
            .admin()
            .soft_delete(SoftDeletable::ResourceFile, file_id)
            .await?;
        Ok(())
    }
}
