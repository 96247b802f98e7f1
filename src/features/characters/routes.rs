use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::characters::handlers;
use crate::features::characters::services::CharacterService;

/// Create routes for the characters feature
pub fn routes(service: Arc<CharacterService>) -> Router {
    Router::new()
        .route(
            "/api/characters",
            get(handlers::list_characters).post(handlers::create_character),
        )
        .route(
            "/api/characters/{id}",
            get(handlers::get_character)
                .patch(handlers::update_character)
                .delete(handlers::delete_character),
        )
        .with_state(service)
}
