//! Request extractors whose rejections use the `ApiResponse` error envelope
//! instead of axum's plain-text bodies.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// JSON body; malformed or mistyped bodies are a 400 envelope
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(json_rejection)
    }
}

/// Query string, e.g. pagination or `daysOld`; bad values are a 400 envelope
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(query_rejection)
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    let message = match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err.body_text()),
        JsonRejection::JsonSyntaxError(err) => {
            format!("Invalid JSON syntax: {}", err.body_text())
        }
        JsonRejection::MissingJsonContentType(_) => {
            "Expected a request with `Content-Type: application/json`".to_string()
        }
        _ => "Failed to parse JSON body".to_string(),
    };
    AppError::BadRequest(message)
}

fn query_rejection(rejection: QueryRejection) -> AppError {
    AppError::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
}

/// The caller placed in request extensions by `auth_middleware`
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::with_member_auth;
    use crate::shared::types::PaginationQuery;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Router,
    };
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Deserialize)]
    struct Rename {
        name: String,
    }

    async fn rename(AppJson(body): AppJson<Rename>) -> String {
        body.name
    }

    async fn page(AppQuery(query): AppQuery<PaginationQuery>) -> String {
        format!("{}:{}", query.offset(), query.limit())
    }

    async fn whoami(user: AuthenticatedUser) -> String {
        user.sub
    }

    fn app() -> Router {
        Router::new()
            .route("/rename", post(rename))
            .route("/page", get(page))
            .route("/whoami", get(whoami))
    }

    #[tokio::test]
    async fn test_bad_json_is_an_enveloped_bad_request() {
        let server = TestServer::new(app()).unwrap();

        server
            .post("/rename")
            .json(&json!({ "name": "Aria" }))
            .await
            .assert_text("Aria");

        let response = server
            .post("/rename")
            .json(&json!({ "name": 7 }))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON data"));
    }

    #[tokio::test]
    async fn test_bad_query_is_an_enveloped_bad_request() {
        let server = TestServer::new(app()).unwrap();

        server.get("/page?page=3&pageSize=20").await.assert_text("40:20");

        let response = server.get("/page?page=first").expect_failure().await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid query string"));
    }

    #[tokio::test]
    async fn test_user_extractor_requires_authentication() {
        TestServer::new(app())
            .unwrap()
            .get("/whoami")
            .expect_failure()
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        TestServer::new(with_member_auth(app()))
            .unwrap()
            .get("/whoami")
            .await
            .assert_text("test-member");
    }
}
