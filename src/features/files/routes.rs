use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    cleanup_orphans, delete_file_by_url, disk_usage, serve_file, upload_files,
};
use crate::features::files::services::FileService;

/// Authenticated upload routes; deleting by URL needs the admin role
pub fn routes(file_service: Arc<FileService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/files/upload",
            post(upload_files).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/api/files", delete(delete_file_by_url))
        .with_state(file_service)
}

/// Unauthenticated file serving
pub fn public_routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/uploads/{*path}", get(serve_file))
        .route("/api/files/{*path}", get(serve_file))
        .with_state(file_service)
}

/// Upload-tree maintenance, nested under `/api/admin`
pub fn admin_routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/uploads/usage", get(disk_usage))
        .route("/uploads/cleanup", post(cleanup_orphans))
        .with_state(file_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persistence::SoftDeleteGuard;
    use crate::modules::storage::LocalStorage;
    use crate::shared::test_helpers::{with_admin_auth, with_member_auth, MemoryStore};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;
    use tempfile::TempDir;

    /// PNG signature plus an IHDR chunk for a 100x100 image
    fn png_100x100() -> Vec<u8> {
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&100u32.to_be_bytes());
        bytes.extend_from_slice(&100u32.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes
    }

    async fn service(dir: &TempDir) -> Arc<FileService> {
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let guard = SoftDeleteGuard::new(Arc::new(MemoryStore::new()));
        Arc::new(FileService::new(storage, guard))
    }

    async fn server(dir: &TempDir) -> TestServer {
        let service = service(dir).await;
        let app = with_admin_auth(
            Router::new()
                .merge(routes(Arc::clone(&service), 1024 * 1024))
                .merge(public_routes(Arc::clone(&service)))
                .nest("/api/admin", admin_routes(service)),
        );
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_upload_png_returns_descriptor_with_dimensions() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir).await;

        let form = MultipartForm::new().add_part(
            "files",
            Part::bytes(png_100x100())
                .file_name("profile.png")
                .mime_type("image/png"),
        );
        let response = server.post("/api/files/upload").multipart(form).await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        let file = &body["data"]["files"][0];
        assert_eq!(file["fileName"], "profile.png");
        assert_eq!(file["mimeType"], "image/png");
        assert_eq!(file["contentType"], "IMAGE");
        assert_eq!(file["metadata"]["width"], 100);
        assert_eq!(file["metadata"]["height"], 100);

        let url = file["fileUrl"].as_str().unwrap();
        assert!(url.starts_with("/uploads/profile_"));
        assert!(url.ends_with(".png"));

        let served = server.get(url).await;
        served.assert_status_ok();
        assert_eq!(served.header("content-type"), "image/png");
        assert_eq!(served.as_bytes().len(), png_100x100().len());
    }

    #[tokio::test]
    async fn test_executable_forced_as_image_is_rejected_without_write() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir).await;

        let form = MultipartForm::new()
            .add_text("contentType", "IMAGE")
            .add_part(
                "files",
                Part::bytes(b"MZ\x90\x00".to_vec())
                    .file_name("setup.exe")
                    .mime_type("application/x-msdownload"),
            );
        let response = server
            .post("/api/files/upload")
            .multipart(form)
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_disallowed_mime_is_unsupported_media_type() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir).await;

        let form = MultipartForm::new()
            .add_text("contentType", "IMAGE")
            .add_part(
                "files",
                Part::bytes(b"not really".to_vec())
                    .file_name("photo.png")
                    .mime_type("application/pdf"),
            );
        let response = server
            .post("/api/files/upload")
            .multipart(form)
            .expect_failure()
            .await;
        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_traversal_path_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir).await;

        let response = server
            .get("/api/files/a/..%2F..%2Fetc/passwd")
            .expect_failure()
            .await;
        assert!(
            response.status_code() == StatusCode::BAD_REQUEST
                || response.status_code() == StatusCode::NOT_FOUND
        );

        server
            .get("/uploads/missing.png")
            .expect_failure()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_by_url_reports_outcome() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir).await;

        let form = MultipartForm::new().add_part(
            "files",
            Part::bytes(b"hello".to_vec())
                .file_name("notes.txt")
                .mime_type("text/plain"),
        );
        let body: Value = server.post("/api/files/upload").multipart(form).await.json();
        let url = body["data"]["files"][0]["fileUrl"].as_str().unwrap().to_string();

        let first: Value = server
            .delete("/api/files")
            .json(&serde_json::json!({ "url": url }))
            .await
            .json();
        assert_eq!(first["data"]["deleted"], true);

        let second: Value = server
            .delete("/api/files")
            .json(&serde_json::json!({ "url": url }))
            .await
            .json();
        assert_eq!(second["data"]["deleted"], false);
    }

    #[tokio::test]
    async fn test_usage_endpoint_counts_subfolders() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir).await;

        let form = MultipartForm::new().add_text("subfolder", "docs").add_part(
            "files",
            Part::bytes(b"abc".to_vec())
                .file_name("a.txt")
                .mime_type("text/plain"),
        );
        server
            .post("/api/files/upload")
            .multipart(form)
            .await
            .assert_status(StatusCode::CREATED);

        let body: Value = server.get("/api/admin/uploads/usage").await.json();
        assert_eq!(body["data"]["totalFiles"], 1);
        assert_eq!(body["data"]["totalSize"], 3);
        assert_eq!(body["data"]["bySubfolder"]["docs"]["files"], 1);
    }

    #[tokio::test]
    async fn test_members_cannot_delete_by_url() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir).await;
        let server =
            TestServer::new(with_member_auth(routes(service, 1024 * 1024))).unwrap();

        let form = MultipartForm::new().add_part(
            "files",
            Part::bytes(b"keep me".to_vec())
                .file_name("notes.txt")
                .mime_type("text/plain"),
        );
        let body: Value = server.post("/api/files/upload").multipart(form).await.json();
        let url = body["data"]["files"][0]["fileUrl"].as_str().unwrap().to_string();

        server
            .delete("/api/files")
            .json(&serde_json::json!({ "url": url }))
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let stored = url.trim_start_matches("/uploads/");
        assert!(dir.path().join(stored).exists());
    }

    #[tokio::test]
    async fn test_admin_routes_reject_members() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir).await;
        let app = with_member_auth(Router::new().nest("/api/admin", admin_routes(service)));
        let server = TestServer::new(app).unwrap();

        server
            .get("/api/admin/uploads/usage")
            .expect_failure()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
