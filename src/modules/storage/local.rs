//! Local filesystem upload store
//!
//! Files live under a single upload root, optionally one subfolder deep, and
//! are exposed 1:1 under the `/uploads/` public prefix.

use std::collections::{BTreeMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::modules::storage::dimensions::{get_image_dimensions, ImageDimensions};
use crate::modules::storage::policy::{
    generate_safe_filename, get_content_type_from_mime, is_valid_subfolder, mime_from_extension,
    sanitize_file_path, split_extension, ContentType,
};

/// Public URL prefix mirroring the upload root
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Disk usage key for files stored directly under the upload root
pub const ROOT_BUCKET: &str = "root";

/// Result of a successful ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Original name as supplied by the uploader
    pub file_name: String,
    /// Root-relative public URL, e.g. `/uploads/avatars/me_<uuid>.png`
    pub file_url: String,
    pub mime_type: String,
    pub file_size: u64,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ImageDimensions>,
}

/// One uploaded file as received from a multipart form
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl IncomingFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn extension(&self) -> &str {
        split_extension(&self.file_name).1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubfolderUsage {
    pub files: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiskUsage {
    pub total_files: u64,
    pub total_size: u64,
    pub by_subfolder: BTreeMap<String, SubfolderUsage>,
}

/// A file read back from the upload root
#[derive(Debug)]
pub struct StoredFile {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
}

/// Upload store rooted at a local directory
pub struct LocalStorage {
    upload_root: PathBuf,
}

impl LocalStorage {
    /// Create the store, creating the upload root if it is missing
    pub async fn new(upload_root: impl Into<PathBuf>) -> Result<Self> {
        let upload_root = upload_root.into();
        fs::create_dir_all(&upload_root).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to create upload directory {}: {}",
                upload_root.display(),
                e
            ))
        })?;

        info!(upload_root = %upload_root.display(), "Local upload storage ready");
        Ok(Self { upload_root })
    }

    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    /// Persist one file and describe it.
    ///
    /// The payload is written with a single call; I/O errors propagate.
    pub async fn store(
        &self,
        data: &[u8],
        original_filename: &str,
        mime_type: &str,
        subfolder: Option<&str>,
    ) -> Result<FileDescriptor> {
        let directory = match subfolder {
            Some(name) if !is_valid_subfolder(name) => {
                return Err(AppError::BadRequest(format!(
                    "Invalid upload subfolder '{}'",
                    name
                )));
            }
            Some(name) => self.upload_root.join(name),
            None => self.upload_root.clone(),
        };

        fs::create_dir_all(&directory).await?;

        let stored_name = generate_safe_filename(original_filename, &Uuid::new_v4().to_string());
        let path = directory.join(&stored_name);
        fs::write(&path, data).await?;

        let file_url = match subfolder {
            Some(name) => format!("{}/{}/{}", PUBLIC_PREFIX, name, stored_name),
            None => format!("{}/{}", PUBLIC_PREFIX, stored_name),
        };

        let content_type = get_content_type_from_mime(mime_type);
        let metadata = match content_type {
            ContentType::Image => get_image_dimensions(data),
            _ => None,
        };

        debug!(
            path = %path.display(),
            size_bytes = data.len(),
            content_type = %content_type,
            "Stored upload"
        );

        Ok(FileDescriptor {
            file_name: original_filename.to_string(),
            file_url,
            mime_type: mime_type.to_string(),
            file_size: data.len() as u64,
            content_type,
            metadata,
        })
    }

    /// Store a batch concurrently. Results keep input order and settle independently.
    pub async fn upload_files(
        &self,
        files: &[IncomingFile],
        subfolder: Option<&str>,
    ) -> Vec<Result<FileDescriptor>> {
        join_all(
            files
                .iter()
                .map(|file| self.store(&file.data, &file.file_name, &file.mime_type, subfolder)),
        )
        .await
    }

    /// Resolve a sanitized relative path to an existing file inside the root.
    ///
    /// Symlinks are resolved first; anything landing outside the root is refused.
    async fn resolve_existing(&self, relative: &str) -> Result<Option<PathBuf>> {
        let root = fs::canonicalize(&self.upload_root).await?;
        let candidate = root.join(relative);

        let resolved = match fs::canonicalize(&candidate).await {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if !resolved.starts_with(&root) {
            warn!(
                requested = %relative,
                resolved = %resolved.display(),
                "Refusing path outside upload root"
            );
            return Ok(None);
        }

        if !fs::metadata(&resolved).await?.is_file() {
            return Ok(None);
        }

        Ok(Some(resolved))
    }

    /// Read a file for serving; `path` is client-supplied and sanitized here
    pub async fn read(&self, path: &str) -> Result<Option<StoredFile>> {
        let relative = sanitize_file_path(path)
            .ok_or_else(|| AppError::BadRequest("Invalid file path".to_string()))?;

        let Some(resolved) = self.resolve_existing(&relative).await? else {
            return Ok(None);
        };

        let data = fs::read(&resolved).await?;
        let mime_type = mime_from_extension(split_extension(&relative).1);
        Ok(Some(StoredFile { data, mime_type }))
    }

    /// Delete by public URL. Returns `false` when there was nothing to delete
    /// or the path was refused; never errors.
    pub async fn delete_file(&self, file_url: &str) -> bool {
        let prefix = format!("{}/", PUBLIC_PREFIX);
        let relative = file_url.strip_prefix(&prefix).unwrap_or(file_url);

        let Some(relative) = sanitize_file_path(relative) else {
            warn!(file_url = %file_url, "Refusing to delete unsafe path");
            return false;
        };

        let resolved = match self.resolve_existing(&relative).await {
            Ok(Some(path)) => path,
            Ok(None) => return false,
            Err(e) => {
                warn!(file_url = %file_url, error = %e, "Failed to resolve upload for deletion");
                return false;
            }
        };

        match fs::remove_file(&resolved).await {
            Ok(()) => {
                debug!(path = %resolved.display(), "Deleted upload");
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = %resolved.display(), error = %e, "Failed to delete upload");
                false
            }
        }
    }

    /// Delete every URL independently, returning how many files were removed
    pub async fn delete_files(&self, file_urls: &[String]) -> usize {
        join_all(file_urls.iter().map(|url| self.delete_file(url)))
            .await
            .into_iter()
            .filter(|deleted| *deleted)
            .count()
    }

    /// Every regular file under the root as `(relative path, size)`
    async fn walk_files(&self) -> Result<Vec<(PathBuf, u64)>> {
        let mut files = Vec::new();
        let mut pending = vec![self.upload_root.clone()];

        while let Some(directory) = pending.pop() {
            let mut entries = fs::read_dir(&directory).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    let size = entry.metadata().await?.len();
                    if let Ok(relative) = entry.path().strip_prefix(&self.upload_root) {
                        files.push((relative.to_path_buf(), size));
                    }
                }
            }
        }

        Ok(files)
    }

    /// Aggregate and per-subfolder usage of the upload root
    pub async fn disk_usage(&self) -> Result<DiskUsage> {
        let mut usage = DiskUsage::default();

        for (relative, size) in self.walk_files().await? {
            usage.total_files += 1;
            usage.total_size += size;

            let bucket = if relative.components().count() > 1 {
                relative
                    .components()
                    .next()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .unwrap_or_else(|| ROOT_BUCKET.to_string())
            } else {
                ROOT_BUCKET.to_string()
            };

            let entry = usage.by_subfolder.entry(bucket).or_default();
            entry.files += 1;
            entry.size += size;
        }

        Ok(usage)
    }

    /// Delete every file whose public URL is not in `referenced_urls`.
    ///
    /// Files written after the caller took its snapshot are indistinguishable
    /// from orphans; run one sweep at a time.
    pub async fn cleanup_orphaned_files(&self, referenced_urls: &HashSet<String>) -> Result<usize> {
        let mut deleted = 0;

        for (relative, _) in self.walk_files().await? {
            let url = public_url(&relative);
            if referenced_urls.contains(&url) {
                continue;
            }

            let path = self.upload_root.join(&relative);
            match fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(file_url = %url, "Removed orphaned upload");
                    deleted += 1;
                }
                Err(e) => warn!(file_url = %url, error = %e, "Failed to remove orphaned upload"),
            }
        }

        info!(deleted, "Orphaned upload sweep finished");
        Ok(deleted)
    }
}

/// Public URL for a path relative to the upload root
fn public_url(relative: &Path) -> String {
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("{}/{}", PUBLIC_PREFIX, segments.join("/"))
}
