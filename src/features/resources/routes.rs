use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::features::resources::handlers;
use crate::features::resources::services::ResourceService;

/// Create routes for the resources feature
pub fn routes(service: Arc<ResourceService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/resources",
            get(handlers::list_resources).post(handlers::create_resource),
        )
        .route(
            "/api/resources/{id}",
            get(handlers::get_resource)
                .patch(handlers::update_resource)
                .delete(handlers::delete_resource),
        )
        .route("/api/resources/{id}/files", post(handlers::attach_files))
        .route(
            "/api/resources/{id}/files/{file_id}",
            delete(handlers::delete_resource_file),
        )
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(service)
}
