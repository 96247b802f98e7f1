use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{
    DiskUsageDto, OrphanCleanupDto, RejectedFileDto, UploadResultDto,
};
use crate::modules::persistence::{FindOptions, Filter, SoftDeleteGuard, Table};
use crate::modules::storage::{
    get_content_type_from_mime, is_valid_subfolder, validate, ContentType, FileDescriptor,
    FileValidationError, IncomingFile, LocalStorage, StoredFile,
};

/// Why a file in a batch was not stored
#[derive(Debug, Clone)]
pub enum RejectionReason {
    Invalid(FileValidationError),
    StoreFailed,
}

#[derive(Debug, Clone)]
pub struct Rejection {
    pub file_name: String,
    pub reason: RejectionReason,
}

impl From<Rejection> for RejectedFileDto {
    fn from(rejection: Rejection) -> Self {
        let error = match rejection.reason {
            RejectionReason::Invalid(e) => e.to_string(),
            RejectionReason::StoreFailed => "failed to store file".to_string(),
        };
        Self {
            file_name: rejection.file_name,
            error,
        }
    }
}

/// Result of validating and storing a batch
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub stored: Vec<FileDescriptor>,
    pub rejected: Vec<Rejection>,
}

impl IngestOutcome {
    /// Fold per-file write results in; a failed write only rejects its own file
    fn record(&mut self, files: Vec<IncomingFile>, results: Vec<Result<FileDescriptor>>) {
        for (file, result) in files.into_iter().zip(results) {
            match result {
                Ok(descriptor) => self.stored.push(descriptor),
                Err(e) => {
                    error!(file_name = %file.file_name, error = %e, "Failed to store upload");
                    self.rejected.push(Rejection {
                        file_name: file.file_name,
                        reason: RejectionReason::StoreFailed,
                    });
                }
            }
        }
    }

    pub fn rejected_dtos(&self) -> Vec<RejectedFileDto> {
        self.rejected.iter().cloned().map(Into::into).collect()
    }

    /// Error for a batch in which nothing was stored
    pub fn into_rejection_error(self) -> AppError {
        match <[Rejection; 1]>::try_from(self.rejected) {
            Ok([Rejection {
                reason: RejectionReason::Invalid(e),
                ..
            }]) => AppError::FileValidation(e),
            Ok([single]) => AppError::Internal(format!(
                "Failed to store file '{}'",
                single.file_name
            )),
            Err(rejected) => AppError::Validation(
                rejected
                    .into_iter()
                    .map(|r| {
                        let dto = RejectedFileDto::from(r);
                        format!("{}: {}", dto.file_name, dto.error)
                    })
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        }
    }
}

/// Service for upload ingestion and upload-tree maintenance
pub struct FileService {
    storage: Arc<LocalStorage>,
    guard: SoftDeleteGuard,
}

impl FileService {
    pub fn new(storage: Arc<LocalStorage>, guard: SoftDeleteGuard) -> Self {
        Self { storage, guard }
    }

    /// Validate every file, then store the accepted ones concurrently.
    ///
    /// Nothing touches the disk for a file that fails validation. With
    /// `content_type` set, every file is checked against that class;
    /// otherwise each file is classified by its own MIME type.
    pub async fn ingest(
        &self,
        files: Vec<IncomingFile>,
        subfolder: Option<&str>,
        content_type: Option<ContentType>,
    ) -> Result<IngestOutcome> {
        if let Some(name) = subfolder {
            if !is_valid_subfolder(name) {
                return Err(AppError::BadRequest(format!(
                    "Invalid upload subfolder '{}'",
                    name
                )));
            }
        }

        let mut outcome = IngestOutcome::default();
        let mut accepted = Vec::with_capacity(files.len());

        for file in files {
            let class =
                content_type.unwrap_or_else(|| get_content_type_from_mime(&file.mime_type));
            match validate(&file.mime_type, file.size(), file.extension(), class) {
                Ok(()) => accepted.push(file),
                Err(e) => {
                    debug!(file_name = %file.file_name, reason = %e, "Upload rejected");
                    outcome.rejected.push(Rejection {
                        file_name: file.file_name,
                        reason: RejectionReason::Invalid(e),
                    });
                }
            }
        }

        let results = self.storage.upload_files(&accepted, subfolder).await;
        outcome.record(accepted, results);

        Ok(outcome)
    }

    /// Ingest a batch; fails if not a single file could be stored
    pub async fn upload(
        &self,
        files: Vec<IncomingFile>,
        subfolder: Option<&str>,
        content_type: Option<ContentType>,
    ) -> Result<UploadResultDto> {
        if files.is_empty() {
            return Err(AppError::BadRequest(
                "At least one file is required".to_string(),
            ));
        }

        let outcome = self.ingest(files, subfolder, content_type).await?;
        if outcome.stored.is_empty() {
            return Err(outcome.into_rejection_error());
        }

        info!(
            stored = outcome.stored.len(),
            rejected = outcome.rejected.len(),
            "Upload batch processed"
        );

        let rejected = outcome.rejected_dtos();
        Ok(UploadResultDto {
            files: outcome.stored,
            rejected,
        })
    }

    pub async fn delete_by_url(&self, url: &str) -> bool {
        self.storage.delete_file(url).await
    }

    /// Remove stored bytes for descriptors whose metadata could not be persisted
    pub async fn discard(&self, descriptors: &[FileDescriptor]) -> usize {
        let urls: Vec<String> = descriptors.iter().map(|d| d.file_url.clone()).collect();
        self.storage.delete_files(&urls).await
    }

    pub async fn read(&self, path: &str) -> Result<StoredFile> {
        self.storage
            .read(path)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    pub async fn disk_usage(&self) -> Result<DiskUsageDto> {
        Ok(self.storage.disk_usage().await?.into())
    }

    /// Public URLs still referenced by live records
    async fn referenced_urls(&self) -> Result<HashSet<String>> {
        let mut referenced = HashSet::new();

        let files = self
            .guard
            .find_many(Table::ResourceFiles, &Filter::new(), &FindOptions::new())
            .await?;
        let avatars = self
            .guard
            .find_many(
                Table::Characters,
                &Filter::new().is_not_null("avatar_url"),
                &FindOptions::new(),
            )
            .await?;

        let urls = files
            .iter()
            .filter_map(|row| row.get("file_url"))
            .chain(avatars.iter().filter_map(|row| row.get("avatar_url")))
            .filter_map(Value::as_str);
        referenced.extend(urls.map(str::to_string));

        Ok(referenced)
    }

    /// Delete every stored file no live record points at
    pub async fn cleanup_orphans(&self) -> Result<OrphanCleanupDto> {
        let referenced = self.referenced_urls().await?;
        let deleted = self.storage.cleanup_orphaned_files(&referenced).await?;
        Ok(OrphanCleanupDto { deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persistence::{Changes, SoftDeletable};
    use crate::shared::test_helpers::MemoryStore;
    use axum::body::Bytes;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, SoftDeleteGuard, FileService) {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let guard = SoftDeleteGuard::new(Arc::new(MemoryStore::new()));
        let service = FileService::new(storage, guard.clone());
        (dir, guard, service)
    }

    fn incoming(name: &str, mime: &str, data: &'static [u8]) -> IncomingFile {
        IncomingFile {
            file_name: name.to_string(),
            mime_type: mime.to_string(),
            data: Bytes::from_static(data),
        }
    }

    fn entries(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_forced_image_class_rejects_executable_before_writing() {
        let (dir, _, service) = setup().await;

        let result = service
            .upload(
                vec![incoming("setup.exe", "application/x-msdownload", b"MZ")],
                None,
                Some(ContentType::Image),
            )
            .await;

        assert!(matches!(
            result,
            Err(AppError::FileValidation(
                FileValidationError::InvalidExtension { .. }
            ))
        ));
        assert_eq!(entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_mixed_batch_reports_rejections() {
        let (_dir, _, service) = setup().await;

        let result = service
            .upload(
                vec![
                    incoming("notes.txt", "text/plain", b"hello"),
                    incoming("clip.png", "video/mp4", b"\x00\x00\x00\x18ftyp"),
                ],
                Some("docs"),
                None,
            )
            .await
            .unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].content_type, ContentType::Other);
        assert!(result.files[0].file_url.starts_with("/uploads/docs/notes_"));
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].file_name, "clip.png");
        assert!(result.rejected[0].error.contains("not allowed for VIDEO"));
    }

    #[tokio::test]
    async fn test_all_rejected_is_a_validation_error() {
        let (dir, _, service) = setup().await;

        let result = service
            .upload(
                vec![
                    incoming("a.exe", "image/png", b"MZ"),
                    incoming("b.png", "application/x-msdownload", b"MZ"),
                ],
                None,
                Some(ContentType::Image),
            )
            .await;

        match result {
            Err(AppError::Validation(message)) => {
                assert!(message.starts_with("a.exe: "));
                assert!(message.contains("; b.png: "));
            }
            other => panic!("expected validation error, got {:?}", other.map(|r| r.files)),
        }
        assert_eq!(entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_per_file() {
        let (dir, _, service) = setup().await;
        // A regular file where the subfolder should go makes every write fail
        std::fs::write(dir.path().join("docs"), b"").unwrap();

        let outcome = service
            .ingest(
                vec![
                    incoming("notes.txt", "text/plain", b"hello"),
                    incoming("clip.exe", "video/mp4", b"MZ"),
                ],
                Some("docs"),
                None,
            )
            .await
            .unwrap();

        assert!(outcome.stored.is_empty());
        let rejected = outcome.rejected_dtos();
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].file_name, "clip.exe");
        assert_eq!(rejected[1].file_name, "notes.txt");
        assert_eq!(rejected[1].error, "failed to store file");
        assert!(matches!(
            outcome.rejected[1].reason,
            RejectionReason::StoreFailed
        ));

        match service
            .upload(vec![incoming("notes.txt", "text/plain", b"hello")], Some("docs"), None)
            .await
        {
            Err(AppError::Internal(message)) => assert!(message.contains("notes.txt")),
            other => panic!("expected internal error, got {:?}", other.map(|r| r.files)),
        }
    }

    #[test]
    fn test_failed_write_keeps_its_siblings() {
        let descriptor = |name: &str| FileDescriptor {
            file_name: name.to_string(),
            file_url: format!("/uploads/{}", name),
            mime_type: "text/plain".to_string(),
            file_size: 1,
            content_type: ContentType::Other,
            metadata: None,
        };
        let files = vec![
            incoming("a.txt", "text/plain", b"a"),
            incoming("b.txt", "text/plain", b"b"),
            incoming("c.txt", "text/plain", b"c"),
        ];
        let results = vec![
            Ok(descriptor("a.txt")),
            Err(AppError::Internal("disk full".to_string())),
            Ok(descriptor("c.txt")),
        ];

        let mut outcome = IngestOutcome::default();
        outcome.record(files, results);

        let stored: Vec<&str> = outcome.stored.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(stored, vec!["a.txt", "c.txt"]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].file_name, "b.txt");
    }

    #[tokio::test]
    async fn test_invalid_subfolder_is_refused_up_front() {
        let (_dir, _, service) = setup().await;
        let result = service
            .upload(
                vec![incoming("a.png", "image/png", b"x")],
                Some("../etc"),
                None,
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_empty_batch_is_bad_request() {
        let (_dir, _, service) = setup().await;
        let result = service.upload(vec![], None, None).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_cleanup_keeps_live_references_only() {
        let (_dir, guard, service) = setup().await;

        let stored = service
            .upload(
                vec![
                    incoming("kept.txt", "text/plain", b"1"),
                    incoming("avatar.txt", "text/plain", b"2"),
                    incoming("trashed.txt", "text/plain", b"3"),
                    incoming("orphan.txt", "text/plain", b"4"),
                ],
                None,
                None,
            )
            .await
            .unwrap()
            .files;

        guard
            .create(
                Table::ResourceFiles,
                &Changes::new().set("file_url", stored[0].file_url.as_str()),
            )
            .await
            .unwrap();
        guard
            .create(
                Table::Characters,
                &Changes::new()
                    .set("name", "Aria")
                    .set("avatar_url", stored[1].file_url.as_str()),
            )
            .await
            .unwrap();
        let trashed = guard
            .create(
                Table::ResourceFiles,
                &Changes::new().set("file_url", stored[2].file_url.as_str()),
            )
            .await
            .unwrap();
        let trashed_id = serde_json::from_value(trashed["id"].clone()).unwrap();
        guard
            .admin()
            .soft_delete(SoftDeletable::ResourceFile, trashed_id)
            .await
            .unwrap();

        let result = service.cleanup_orphans().await.unwrap();
        assert_eq!(result.deleted, 2);

        let usage = service.disk_usage().await.unwrap();
        assert_eq!(usage.total_files, 2);
        assert_eq!(usage.total_size_formatted, "2 Bytes");
        assert!(service.read(&stored[0].file_url["/uploads/".len()..]).await.is_ok());
        assert!(matches!(
            service.read(&stored[3].file_url["/uploads/".len()..]).await,
            Err(AppError::NotFound(_))
        ));
    }
}
