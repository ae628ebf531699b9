//! Remote memo store: the two JSON endpoints and their backends.

mod github;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mapmemo_shared::models::{empty_city_memos, City, CityMemos};
use serde::Serialize;
use thiserror::Error;

pub use github::GitHubStore;

#[derive(Debug, Error)]
pub enum MemoStoreError {
    #[error("GitHub token not configured")]
    NotConfigured,
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("memo document changed since it was read")]
    Conflict,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid memo document: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for MemoStoreError {
    fn from(e: reqwest::Error) -> Self {
        MemoStoreError::Storage(e.to_string())
    }
}

/// Per-city memo lists behind a read-modify-write document.
#[async_trait]
pub trait MemoStore: Send + Sync {
    async fn load(&self) -> Result<CityMemos, MemoStoreError>;
    async fn save(&self, memos: &CityMemos) -> Result<(), MemoStoreError>;
}

pub type SharedMemoStore = Arc<dyn MemoStore>;

/// What a store returns before anything has been saved.
pub fn default_memos() -> CityMemos {
    empty_city_memos(&City::defaults())
}

/// JSON error body with a status chosen per failure kind.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<MemoStoreError> for ApiError {
    fn from(e: MemoStoreError) -> Self {
        let status = match &e {
            MemoStoreError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            MemoStoreError::Conflict => StatusCode::CONFLICT,
            MemoStoreError::NotConfigured
            | MemoStoreError::Storage(_)
            | MemoStoreError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
}

pub async fn get_memos(
    State(store): State<SharedMemoStore>,
) -> Result<Json<CityMemos>, ApiError> {
    let memos = store.load().await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to load memos");
        e
    })?;
    Ok(Json(memos))
}

pub async fn save_memos(
    State(store): State<SharedMemoStore>,
    body: Result<Json<CityMemos>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(memos) = body?;
    store.save(&memos).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to save memos");
        e
    })?;
    tracing::info!(
        cities = memos.len(),
        memos = memos.values().map(Vec::len).sum::<usize>(),
        "Saved memos"
    );
    Ok(Json(SaveResponse {
        success: true,
        message: "Memos saved".to_string(),
    }))
}

pub fn router(store: SharedMemoStore) -> axum::Router {
    axum::Router::new()
        .route(
            "/api/memos",
            axum::routing::get(get_memos).post(save_memos),
        )
        .with_state(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    /// In-memory store that can be told to fail.
    #[derive(Default)]
    struct FakeStore {
        doc: Mutex<Option<CityMemos>>,
        fail: Option<fn() -> MemoStoreError>,
    }

    #[async_trait]
    impl MemoStore for FakeStore {
        async fn load(&self) -> Result<CityMemos, MemoStoreError> {
            if let Some(fail) = self.fail {
                return Err(fail());
            }
            Ok(self.doc.lock().await.clone().unwrap_or_else(default_memos))
        }

        async fn save(&self, memos: &CityMemos) -> Result<(), MemoStoreError> {
            if let Some(fail) = self.fail {
                return Err(fail());
            }
            *self.doc.lock().await = Some(memos.clone());
            Ok(())
        }
    }

    fn app(store: FakeStore) -> axum::Router {
        router(Arc::new(store))
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/memos")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get() -> Request<Body> {
        Request::builder()
            .uri("/api/memos")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_defaults_to_empty_cities() {
        let resp = app(FakeStore::default()).oneshot(get()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({ "Cahaya": [], "Gangnam": [], "RedCity": [] })
        );
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let app = app(FakeStore::default());
        let doc = r#"{"Gangnam":[{"id":"memo_1","title":"Meet here","description":"",
            "images":[],"createdAt":"2024-05-01T10:00:00Z"}],"RedCity":[],"Cahaya":[]}"#;
        let resp = app.clone().oneshot(post(doc)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({ "success": true, "message": "Memos saved" })
        );

        let resp = app.oneshot(get()).await.unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["Gangnam"][0]["title"], "Meet here");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let resp = app(FakeStore::default())
            .oneshot(post(r#"{"Gangnam": "nope"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let req = Request::builder()
            .method("DELETE")
            .uri("/api/memos")
            .body(Body::empty())
            .unwrap();
        let resp = app(FakeStore::default()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_missing_token_is_500() {
        let store = FakeStore {
            fail: Some(|| MemoStoreError::NotConfigured),
            ..FakeStore::default()
        };
        let resp = app(store).oneshot(get()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await["error"],
            "GitHub token not configured"
        );
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let cases: [(fn() -> MemoStoreError, StatusCode); 3] = [
            (
                || MemoStoreError::Upstream {
                    status: 422,
                    message: "sha mismatch".to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (|| MemoStoreError::Conflict, StatusCode::CONFLICT),
            (
                || MemoStoreError::Storage("disk full".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (fail, expected) in cases {
            let store = FakeStore {
                fail: Some(fail),
                ..FakeStore::default()
            };
            let resp = app(store).oneshot(post("{}")).await.unwrap();
            assert_eq!(resp.status(), expected);
        }
    }
}
