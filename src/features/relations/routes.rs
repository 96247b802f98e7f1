use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::relations::handlers;
use crate::features::relations::services::RelationService;

pub fn routes(service: Arc<RelationService>) -> Router {
    Router::new()
        .route(
            "/api/relation-types",
            get(handlers::list_relation_types).post(handlers::create_relation_type),
        )
        .route(
            "/api/characters/{id}/relations",
            get(handlers::list_character_relations),
        )
        .route("/api/relations", post(handlers::create_relation))
        .route("/api/relations/{id}", delete(handlers::delete_relation))
        .with_state(service)
}
