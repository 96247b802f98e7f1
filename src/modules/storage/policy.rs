//! Upload acceptance policy
//!
//! Pure functions with no I/O: content classification, extension/MIME
//! whitelists, size ceilings, storage naming, and upload path sanitization.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

const KIB: u64 = 1024;
const GIB: u64 = KIB * KIB * KIB;

/// Longest sanitized base name kept in a stored filename
pub const MAX_SAFE_BASE_LEN: usize = 50;

lazy_static! {
    /// Characters allowed in a stored base filename
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_-]").unwrap();

    /// Subfolder names are a single segment of safe characters
    static ref SUBFOLDER_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Content classification governing extension/MIME/size rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    Image,
    Video,
    Other,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Image, ContentType::Video, ContentType::Other];

    /// Maximum accepted size in bytes.
    ///
    /// This is the only definition of the ceilings; the request body limit is
    /// derived from [`ContentType::largest_ceiling`].
    pub const fn max_size(self) -> u64 {
        match self {
            ContentType::Image => GIB,
            ContentType::Video => 10 * GIB,
            ContentType::Other => GIB,
        }
    }

    pub const fn largest_ceiling() -> u64 {
        let mut largest = 0;
        let mut i = 0;
        while i < Self::ALL.len() {
            let ceiling = Self::ALL[i].max_size();
            if ceiling > largest {
                largest = ceiling;
            }
            i += 1;
        }
        largest
    }

    /// Accepted extensions (lowercase, with dot). `None` accepts anything.
    pub fn allowed_extensions(self) -> Option<&'static [&'static str]> {
        match self {
            ContentType::Image => Some(&[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"]),
            ContentType::Video => Some(&[".mp4", ".webm", ".ogg", ".mov"]),
            ContentType::Other => None,
        }
    }

    /// Accepted MIME types. `None` accepts anything.
    pub fn allowed_mime_types(self) -> Option<&'static [&'static str]> {
        match self {
            ContentType::Image => Some(&[
                "image/jpeg",
                "image/png",
                "image/gif",
                "image/webp",
                "image/svg+xml",
            ]),
            ContentType::Video => Some(&[
                "video/mp4",
                "video/webm",
                "video/ogg",
                "video/quicktime",
            ]),
            ContentType::Other => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Image => "IMAGE",
            ContentType::Video => "VIDEO",
            ContentType::Other => "OTHER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IMAGE" => Some(ContentType::Image),
            "VIDEO" => Some(ContentType::Video),
            "OTHER" => Some(ContentType::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason a single file was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileValidationError {
    #[error("file extension '{extension}' is not allowed for {content_type}")]
    InvalidExtension {
        extension: String,
        content_type: ContentType,
    },

    #[error("file type '{mime_type}' is not allowed for {content_type}")]
    InvalidMimeType {
        mime_type: String,
        content_type: ContentType,
    },

    #[error("file exceeds maximum size for {content_type}: {}", format_file_size(*.max))]
    TooLarge {
        size: u64,
        max: u64,
        content_type: ContentType,
    },
}

/// Classify a MIME type by prefix
pub fn get_content_type_from_mime(mime_type: &str) -> ContentType {
    if mime_type.starts_with("image/") {
        ContentType::Image
    } else if mime_type.starts_with("video/") {
        ContentType::Video
    } else {
        ContentType::Other
    }
}

/// Case-insensitive extension check; `extension` may be given with or without the dot
pub fn is_valid_file_extension(extension: &str, content_type: ContentType) -> bool {
    let Some(allowed) = content_type.allowed_extensions() else {
        return true;
    };
    let normalized = format!(".{}", extension.trim_start_matches('.').to_ascii_lowercase());
    allowed.contains(&normalized.as_str())
}

pub fn is_valid_mime_type(mime_type: &str, content_type: ContentType) -> bool {
    match content_type.allowed_mime_types() {
        Some(allowed) => allowed.contains(&mime_type),
        None => true,
    }
}

pub fn is_valid_file_size(size: u64, content_type: ContentType) -> bool {
    size <= content_type.max_size()
}

/// Run every policy check for one file
pub fn validate(
    mime_type: &str,
    file_size: u64,
    extension: &str,
    content_type: ContentType,
) -> Result<(), FileValidationError> {
    if !is_valid_file_extension(extension, content_type) {
        return Err(FileValidationError::InvalidExtension {
            extension: extension.to_string(),
            content_type,
        });
    }

    if !is_valid_mime_type(mime_type, content_type) {
        return Err(FileValidationError::InvalidMimeType {
            mime_type: mime_type.to_string(),
            content_type,
        });
    }

    if !is_valid_file_size(file_size, content_type) {
        return Err(FileValidationError::TooLarge {
            size: file_size,
            max: content_type.max_size(),
            content_type,
        });
    }

    Ok(())
}

/// Split a name into `(base, extension)`, the extension keeping its dot.
///
/// Only a trailing run of ASCII alphanumerics counts as an extension, so the
/// result is always safe to append to a stored name. Dotfiles have no extension.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext = &name[idx + 1..];
            if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
            {
                (&name[..idx], &name[idx..])
            } else {
                (name, "")
            }
        }
        _ => (name, ""),
    }
}

/// Build `<sanitized-base>_<id><ext>` from an untrusted original name
pub fn generate_safe_filename(original_name: &str, id: &str) -> String {
    let (base, extension) = split_extension(original_name);
    let sanitized = UNSAFE_FILENAME_CHARS.replace_all(base, "_");
    let truncated: String = sanitized.chars().take(MAX_SAFE_BASE_LEN).collect();
    format!("{}_{}{}", truncated, id, extension)
}

/// Gate between a client-supplied path and the filesystem.
///
/// Rejects `..` and backslashes anywhere, strips leading slashes, and rejects
/// anything that is empty afterwards.
pub fn sanitize_file_path(path: &str) -> Option<String> {
    if path.contains("..") || path.contains('\\') {
        return None;
    }

    let stripped = path.trim_start_matches('/');
    if stripped.trim().is_empty() {
        return None;
    }

    Some(stripped.to_string())
}

pub fn is_valid_subfolder(name: &str) -> bool {
    SUBFOLDER_REGEX.is_match(name)
}

/// Human readable size using 1024-based units
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut divisor = 1u64;
    while unit < UNITS.len() - 1 && bytes >= divisor * KIB {
        divisor *= KIB;
        unit += 1;
    }

    let value = ((bytes as f64 / divisor as f64) * 100.0).round() / 100.0;
    let mut rendered = format!("{:.2}", value);
    while rendered.ends_with('0') {
        rendered.pop();
    }
    if rendered.ends_with('.') {
        rendered.pop();
    }

    format!("{} {}", rendered, UNITS[unit])
}

/// MIME type used when serving a stored file back
pub fn mime_from_extension(extension: &str) -> &'static str {
    match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain; charset=utf-8",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
