use std::collections::HashMap;

use axum::extract::Multipart;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::modules::storage::{ContentType, IncomingFile};

/// Multipart field names carrying file payloads
const FILE_FIELDS: [&str; 2] = ["files", "file"];

/// A fully read multipart upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<IncomingFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Read every part. File parts are buffered; other parts become text fields.
    pub async fn read(multipart: &mut Multipart) -> Result<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Failed to read multipart field: {}", e);
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        })? {
            let field_name = field.name().unwrap_or("").to_string();

            if FILE_FIELDS.contains(&field_name.as_str()) {
                let mime_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                form.files.push(IncomingFile {
                    file_name,
                    mime_type,
                    data,
                });
            } else {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read field '{}': {}", field_name, e))
                })?;
                form.fields.insert(field_name, text);
            }
        }

        Ok(form)
    }

    /// A text field, with empty values treated as absent
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn content_type(&self) -> Result<Option<ContentType>> {
        self.field("contentType")
            .map(|raw| {
                ContentType::parse(raw).ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Invalid contentType '{}'. Expected IMAGE, VIDEO or OTHER",
                        raw
                    ))
                })
            })
            .transpose()
    }
}
