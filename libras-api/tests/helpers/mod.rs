//! Shared test fixtures: in-memory state, mock providers, request helpers
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use libras_api::api::auth_middleware::AuthSettings;
use libras_api::services::chat_client::{ChatMessage, LlmError, TextModel};
use libras_api::services::image_client::{ImageError, ImageProvider};
use libras_api::services::image_fetcher::BoundedImageFetcher;
use libras_api::AppState;
use libras_common::config::AuthConfig;

pub const TEST_SECRET: &str = "test-signing-secret";

/// Text model returning canned replies in order
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicU32,
}

impl ScriptedModel {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::Api(500, "script exhausted".to_string()))
    }
}

/// Text model that always fails, for upstream-error paths
pub struct FailingModel;

#[async_trait]
impl TextModel for FailingModel {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        Err(LlmError::Api(502, "upstream unavailable".to_string()))
    }
}

/// Image provider returning a deterministic URL per call
pub struct CountingImageProvider {
    calls: AtomicU32,
    fail: bool,
}

impl CountingImageProvider {
    pub fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for CountingImageProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, ImageError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(ImageError::EmptyResponse);
        }
        Ok(format!("https://img.test/{}", call))
    }
}

/// Build app state over an in-memory database
pub async fn test_state(
    model: Arc<dyn TextModel>,
    provider: Arc<dyn ImageProvider>,
) -> AppState {
    let pool = sqlx::SqlitePool::connect(":memory:").await.unwrap();
    libras_api::db::init_tables(&pool).await.unwrap();

    let fetcher = Arc::new(BoundedImageFetcher::with_backoff(
        provider,
        5,
        3,
        Duration::from_millis(1),
    ));

    AppState::new(pool, model, fetcher)
}

pub fn auth_settings() -> Arc<AuthSettings> {
    Arc::new(
        AuthSettings::new(&AuthConfig {
            secret: TEST_SECRET.to_string(),
            algorithm: "HS256".to_string(),
        })
        .unwrap(),
    )
}

/// Build the full application router around mocks
pub async fn test_app(
    model: Arc<dyn TextModel>,
    provider: Arc<dyn ImageProvider>,
) -> Router {
    let state = test_state(model, provider).await;
    libras_api::build_router(state, auth_settings())
}

/// Sign a valid bearer token expiring in one hour
pub fn bearer_token() -> String {
    token_with_exp(chrono::Utc::now().timestamp() + 3600)
}

/// Sign a token with an arbitrary expiry
pub fn token_with_exp(exp: i64) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({ "sub": "test-user", "exp": exp }),
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Send one request through the router, returning status and JSON body
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Register a user through the API, returning their id
pub async fn register_user(app: &Router, email: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/users/register",
        None,
        Some(json!({
            "name": "Ana",
            "email": email,
            "image_url": "https://avatars.test/ana.png",
            "age": 8,
            "experience_level": "beginner",
            "interest": "animals",
            "learning_time": 30,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "registration failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Canned model replies for one full content-generation pass
pub fn content_script() -> Vec<&'static str> {
    vec![
        r#"Here is the list:
{
    "words_pt": ["gato", "cachorro", "peixe", "passaro", "cavalo"],
    "words_en": ["cat", "dog", "fish", "bird", "horse"]
}"#,
        r#"{
    "sentences_pt": ["gato dormindo", "cachorro correndo", "peixe nadando"],
    "sentences_en": ["sleeping cat", "running dog", "swimming fish"]
}"#,
    ]
}
