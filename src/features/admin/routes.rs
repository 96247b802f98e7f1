use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::TrashService;

/// Trash routes, nested under `/api/admin` (all require the admin role)
pub fn routes(trash_service: Arc<TrashService>) -> Router {
    Router::new()
        .route("/trash/{entity}", get(handlers::list_trash))
        .route("/trash/{entity}/cleanup", post(handlers::cleanup_trash))
        .route("/trash/{entity}/{id}", delete(handlers::purge_entry))
        .route("/trash/{entity}/{id}/restore", post(handlers::restore_entry))
        .with_state(trash_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persistence::{Changes, SoftDeletable, SoftDeleteGuard, Table};
    use crate::shared::test_helpers::{with_admin_auth, with_member_auth, MemoryStore};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    async fn tombstoned_character(guard: &SoftDeleteGuard) -> String {
        let row = guard
            .create(Table::Characters, &Changes::new().set("name", "Aria"))
            .await
            .unwrap();
        let id = row["id"].as_str().unwrap().to_string();
        guard
            .admin()
            .soft_delete(SoftDeletable::Character, id.parse().unwrap())
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn test_trash_round_trip_over_http() {
        let guard = SoftDeleteGuard::new(Arc::new(MemoryStore::new()));
        let id = tombstoned_character(&guard).await;
        let app = with_admin_auth(
            Router::new().nest("/api/admin", routes(Arc::new(TrashService::new(guard.admin())))),
        );
        let server = TestServer::new(app).unwrap();

        let listed: Value = server.get("/api/admin/trash/characters").await.json();
        assert_eq!(listed["meta"]["total"], 1);
        assert_eq!(listed["data"][0]["id"], id.as_str());
        assert_eq!(listed["data"][0]["entity"], "characters");

        server
            .post(&format!("/api/admin/trash/characters/{}/restore", id))
            .await
            .assert_status_ok();
        server
            .post(&format!("/api/admin/trash/characters/{}/restore", id))
            .expect_failure()
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&format!("/api/admin/trash/characters/{}", id))
            .expect_failure()
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let cleanup: Value = server
            .post("/api/admin/trash/characters/cleanup")
            .add_query_param("daysOld", 0)
            .await
            .json();
        assert_eq!(cleanup["data"]["purged"], 0);
    }

    #[tokio::test]
    async fn test_unknown_entity_is_rejected() {
        let guard = SoftDeleteGuard::new(Arc::new(MemoryStore::new()));
        let app = with_admin_auth(
            Router::new().nest("/api/admin", routes(Arc::new(TrashService::new(guard.admin())))),
        );
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/admin/trash/relations")
            .expect_failure()
            .await;
        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn test_trash_requires_admin() {
        let guard = SoftDeleteGuard::new(Arc::new(MemoryStore::new()));
        let app = with_member_auth(
            Router::new().nest("/api/admin", routes(Arc::new(TrashService::new(guard.admin())))),
        );
        let server = TestServer::new(app).unwrap();

        server
            .get("/api/admin/trash/characters")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
