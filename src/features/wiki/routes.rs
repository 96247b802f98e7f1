use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::wiki::handlers;
use crate::features::wiki::services::WikiService;

pub fn routes(service: Arc<WikiService>) -> Router {
    Router::new()
        .route(
            "/api/wiki",
            get(handlers::list_pages).post(handlers::create_page),
        )
        .route(
            "/api/wiki/{slug}",
            get(handlers::get_page)
                .patch(handlers::update_page)
                .delete(handlers::delete_page),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persistence::SoftDeleteGuard;
    use crate::shared::test_helpers::{with_member_auth, MemoryStore};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server() -> TestServer {
        let guard = SoftDeleteGuard::new(Arc::new(MemoryStore::new()));
        let app = with_member_auth(routes(Arc::new(WikiService::new(guard))));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_slug_is_validation_error() {
        let server = server();

        let response = server
            .post("/api/wiki")
            .json(&json!({ "slug": "Aria--Bard", "title": "Aria" }))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_wiki_page_lifecycle_over_http() {
        let server = server();

        server
            .post("/api/wiki")
            .json(&json!({ "slug": "aria", "title": "Aria", "content": "A bard." }))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/api/wiki")
            .json(&json!({ "slug": "aria", "title": "Aria again" }))
            .expect_failure()
            .await
            .assert_status(StatusCode::CONFLICT);

        let page: Value = server.get("/api/wiki/aria").await.json();
        assert_eq!(page["data"]["content"], "A bard.");

        let updated: Value = server
            .patch("/api/wiki/aria")
            .json(&json!({ "title": "Aria the Bard" }))
            .await
            .json();
        assert_eq!(updated["data"]["title"], "Aria the Bard");

        server.delete("/api/wiki/aria").await.assert_status_ok();
        server
            .get("/api/wiki/aria")
            .expect_failure()
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let list: Value = server.get("/api/wiki").await.json();
        assert_eq!(list["meta"]["total"], 0);
    }
}
