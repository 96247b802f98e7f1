use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::characters::{dtos as characters_dtos, handlers as characters_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::relations::{dtos as relations_dtos, handlers as relations_handlers};
use crate::features::resources::{dtos as resources_dtos, handlers as resources_handlers};
use crate::features::wiki::{dtos as wiki_dtos, handlers as wiki_handlers};
use crate::modules::persistence::SoftDeletable;
use crate::modules::storage::{ContentType, FileDescriptor, ImageDimensions, SubfolderUsage};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files
        files_handlers::upload_files,
        files_handlers::delete_file_by_url,
        files_handlers::serve_file,
        files_handlers::disk_usage,
        files_handlers::cleanup_orphans,
        // Characters
        characters_handlers::list_characters,
        characters_handlers::create_character,
        characters_handlers::get_character,
        characters_handlers::update_character,
        characters_handlers::delete_character,
        // Resources
        resources_handlers::create_resource,
        resources_handlers::list_resources,
        resources_handlers::get_resource,
        resources_handlers::update_resource,
        resources_handlers::delete_resource,
        resources_handlers::attach_files,
        resources_handlers::delete_resource_file,
        // Wiki
        wiki_handlers::list_pages,
        wiki_handlers::create_page,
        wiki_handlers::get_page,
        wiki_handlers::update_page,
        wiki_handlers::delete_page,
        // Relations
        relations_handlers::list_relation_types,
        relations_handlers::create_relation_type,
        relations_handlers::list_character_relations,
        relations_handlers::create_relation,
        relations_handlers::delete_relation,
        // Admin (trash)
        admin_handlers::list_trash,
        admin_handlers::restore_entry,
        admin_handlers::purge_entry,
        admin_handlers::cleanup_trash,
    ),
    components(
        schemas(
            Meta,
            ContentType,
            ImageDimensions,
            FileDescriptor,
            SubfolderUsage,
            SoftDeletable,
            // Files
            files_dtos::UploadFilesDto,
            files_dtos::RejectedFileDto,
            files_dtos::UploadResultDto,
            files_dtos::DeleteFileByUrlDto,
            files_dtos::DeleteFileResponseDto,
            files_dtos::DiskUsageDto,
            files_dtos::OrphanCleanupDto,
            // Characters
            characters_dtos::CreateCharacterDto,
            characters_dtos::UpdateCharacterDto,
            characters_dtos::CharacterResponseDto,
            // Resources
            resources_dtos::CreateResourceFormDto,
            resources_dtos::AttachFilesFormDto,
            resources_dtos::UpdateResourceDto,
            resources_dtos::ResourceFileDto,
            resources_dtos::ResourceResponseDto,
            resources_dtos::ResourceDetailDto,
            resources_dtos::CreateResourceResultDto,
            resources_dtos::AttachFilesResultDto,
            // Wiki
            wiki_dtos::CreateWikiPageDto,
            wiki_dtos::UpdateWikiPageDto,
            wiki_dtos::WikiPageResponseDto,
            // Relations
            relations_dtos::CreateRelationTypeDto,
            relations_dtos::RelationTypeResponseDto,
            relations_dtos::CreateRelationDto,
            relations_dtos::RelationResponseDto,
            // Admin
            admin_dtos::TrashEntryDto,
            admin_dtos::RestoredEntryDto,
            admin_dtos::PurgeResultDto,
            // Response envelopes
            ApiResponse<files_dtos::UploadResultDto>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
            ApiResponse<files_dtos::DiskUsageDto>,
            ApiResponse<files_dtos::OrphanCleanupDto>,
            ApiResponse<characters_dtos::CharacterResponseDto>,
            ApiResponse<Vec<characters_dtos::CharacterResponseDto>>,
            ApiResponse<resources_dtos::ResourceDetailDto>,
            ApiResponse<Vec<resources_dtos::ResourceResponseDto>>,
            ApiResponse<resources_dtos::CreateResourceResultDto>,
            ApiResponse<resources_dtos::AttachFilesResultDto>,
            ApiResponse<wiki_dtos::WikiPageResponseDto>,
            ApiResponse<Vec<wiki_dtos::WikiPageResponseDto>>,
            ApiResponse<relations_dtos::RelationTypeResponseDto>,
            ApiResponse<Vec<relations_dtos::RelationTypeResponseDto>>,
            ApiResponse<relations_dtos::RelationResponseDto>,
            ApiResponse<Vec<relations_dtos::RelationResponseDto>>,
            ApiResponse<Vec<admin_dtos::TrashEntryDto>>,
            ApiResponse<admin_dtos::RestoredEntryDto>,
            ApiResponse<admin_dtos::PurgeResultDto>,
        )
    ),
    tags(
        (name = "files", description = "File upload, serving and deletion"),
        (name = "characters", description = "Characters"),
        (name = "resources", description = "Resources and their attached files"),
        (name = "wiki", description = "Wiki pages addressed by slug"),
        (name = "relations", description = "Relation types and relations between characters"),
        (name = "admin", description = "Trash and upload maintenance (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Role Mark API",
        version = "0.1.0",
        description = "API documentation for Role Mark",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_feature_path() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/files/upload",
            "/uploads/{path}",
            "/api/characters/{id}",
            "/api/resources/{id}/files/{file_id}",
            "/api/wiki/{slug}",
            "/api/characters/{id}/relations",
            "/api/admin/trash/{entity}/{id}/restore",
            "/api/admin/uploads/cleanup",
        ] {
            assert!(paths.contains(&expected), "missing path {}", expected);
        }
    }
}
