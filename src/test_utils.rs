use crate::config::AuthdConfig;
use crate::create_app;
use crate::models::{Client, User};
use crate::state::AppState;
use crate::storage::memory::MemoryStore;
use crate::storage::{Storage, StorageBackend};
use axum::body::Body;
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Test fixture wiring the real router over the in-memory storage backend.
///
/// Provides seeding helpers for user/client records and request helpers for
/// the three surfaces (token endpoint, bearer-protected resources, admin).
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration the app was built with
    pub config: AuthdConfig,
    /// Direct handle on the storage backend for seeding and assertions
    pub storage: Arc<Storage>,
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_config(AuthdConfig::for_test()).await
    }

    /// Fixture without a configured admin API key; the admin surface is
    /// not mounted in this configuration
    pub async fn without_api_key() -> Self {
        let mut config = AuthdConfig::for_test();
        config.api_key = String::new();
        Self::with_config(config).await
    }

    pub async fn with_config(config: AuthdConfig) -> Self {
        // Initialize test logger
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let storage = Arc::new(Storage::Memory(MemoryStore::new()));
        let state = AppState {
            config: Arc::new(config.clone()),
            storage: storage.clone(),
        };
        let app = create_app(state).await;

        Self {
            app,
            config,
            storage,
        }
    }

    /// Seed a client record directly into storage
    pub async fn seed_client(&self, client_id: &str, client_secret: &str) {
        self.storage
            .upsert_client(&Client {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            })
            .await
            .expect("Failed to seed client");
    }

    /// Seed a user record directly into storage (legacy plaintext password)
    pub async fn seed_user(&self, user_id: &str, username: &str, password: &str) {
        self.storage
            .upsert_user(&User {
                user_id: user_id.to_string(),
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
            .expect("Failed to seed user");
    }

    /// Number of persisted tokens
    pub async fn token_count(&self) -> usize {
        match self.storage.as_ref() {
            Storage::Memory(store) => store.token_count().await,
            _ => panic!("token_count is only available on the memory backend"),
        }
    }

    /// Revoke a token through the admin endpoint
    pub async fn revoke(&self, token: &str) {
        let api_key = self.config.api_key.clone();
        let response = self
            .post_json(
                "/admin/tokens/revoke",
                &serde_json::json!({ "token": token }),
                Some(&api_key),
            )
            .await;
        response.assert_ok();
    }

    /// POST a form-encoded token request, optionally with HTTP Basic client
    /// credentials
    pub async fn post_token(
        &self,
        form: &[(&str, &str)],
        basic_auth: Option<(&str, &str)>,
    ) -> TestResponse {
        let body = serde_urlencoded::to_string(form).expect("Failed to encode form body");
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/oauth/token")
            .header("Content-Type", "application/x-www-form-urlencoded");

        if let Some((client_id, client_secret)) = basic_auth {
            let encoded = STANDARD.encode(format!("{client_id}:{client_secret}"));
            builder = builder.header("Authorization", format!("Basic {encoded}"));
        }

        let request = builder
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Sends a GET request without any authorization
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri.as_ref())
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Sends a GET request with a bearer access token
    pub async fn get_with_bearer(&self, uri: impl AsRef<str>, token: &str) -> TestResponse {
        self.get_with_header(uri, "Authorization", &format!("Bearer {token}"))
            .await
    }

    /// Sends a GET request with a single custom header
    pub async fn get_with_header(
        &self,
        uri: impl AsRef<str>,
        name: &str,
        value: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri.as_ref())
            .header(name, value)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Sends a PUT request with a JSON body, optionally with an admin API key
    pub async fn put_json<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
        api_key: Option<&str>,
    ) -> TestResponse {
        self.send_json(Method::PUT, uri, body, api_key).await
    }

    /// Sends a POST request with a JSON body, optionally with an admin API key
    pub async fn post_json<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
        api_key: Option<&str>,
    ) -> TestResponse {
        self.send_json(Method::POST, uri, body, api_key).await
    }

    async fn send_json<T: Serialize>(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        body: &T,
        api_key: Option<&str>,
    ) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let mut builder = Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json");

        if let Some(key) = api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let request = builder
            .body(Body::from(json_body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Sends a request and returns a TestResponse
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to an empty object for empty or
        // non-JSON bodies
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }
}

/// Response from a test request that provides convenient access to status,
/// headers and JSON body
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body as JSON (empty object if absent or not valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response status is 200 OK
    pub fn assert_ok(&self) {
        assert_eq!(
            self.status,
            StatusCode::OK,
            "Expected 200 OK, got {}: {}",
            self.status,
            self.json
        );
    }

    /// Asserts a specific response status
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status, expected,
            "Expected {}, got {}: {}",
            expected, self.status, self.json
        );
    }
}
