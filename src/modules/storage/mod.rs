//! Storage module for file ingestion
//!
//! Validates uploads against the content policy, stores them under the local
//! upload root, and maintains that tree (deletes, usage, orphan sweeps).

mod dimensions;
mod local;
mod policy;

pub use dimensions::{get_image_dimensions, ImageDimensions};
pub use local::{
    DiskUsage, FileDescriptor, IncomingFile, LocalStorage, StoredFile, SubfolderUsage,
    PUBLIC_PREFIX,
};
pub use policy::{
    format_file_size, generate_safe_filename, get_content_type_from_mime, is_valid_file_extension,
    is_valid_file_size, is_valid_mime_type, is_valid_subfolder, sanitize_file_path, validate,
    ContentType,
    FileValidationError,
};
