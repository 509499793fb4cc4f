#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use portfolio_api::app::{app, AppState, AuthSettings, HttpOptions, Stores};
use portfolio_api::auth::{issue_session_token, Claims};
use portfolio_api::database::{
    MemoryProjectStore, MemorySettingsStore, NewProject, Project, ProjectFilter, ProjectPatch, ProjectStore, Setting,
    SettingsStore, StoreError,
};
use portfolio_api::identity::{AuthTokens, AuthUser, IdentityError, IdentityProvider};
use portfolio_api::storage::MemoryObjectStorage;

pub const OWNER_ID: &str = "owner-id";
pub const SECRET: &str = "test-session-secret";
pub const AUDIENCE: &str = "authenticated";
pub const BUCKET: &str = "site-assets";
pub const FILE_SIZE_LIMIT: u64 = 1024;

pub const OWNER_EMAIL: &str = "owner@example.com";
pub const VISITOR_EMAIL: &str = "visitor@example.com";
pub const PASSWORD: &str = "correct horse";

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        owner_id: Some(OWNER_ID.to_string()),
        session_secret: SECRET.to_string(),
        audience: AUDIENCE.to_string(),
        cookie_name: "portfolio_session".to_string(),
        secure_cookies: false,
        session_ttl_hours: 24,
    }
}

pub fn token_for(user_id: &str, email: &str) -> String {
    let claims = Claims::new(user_id, Some(email.to_string()), AUDIENCE, chrono::Duration::hours(1));
    issue_session_token(&claims, SECRET).expect("token should sign")
}

/// Identity provider answering for two fixed accounts with locally signed tokens.
pub struct StubIdentity;

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthTokens, IdentityError> {
        let user_id = match (email, password) {
            (OWNER_EMAIL, PASSWORD) => OWNER_ID,
            (VISITOR_EMAIL, PASSWORD) => "visitor-id",
            _ => return Err(IdentityError::InvalidCredentials("Invalid login credentials".into())),
        };
        Ok(AuthTokens {
            access_token: token_for(user_id, email),
            refresh_token: None,
            expires_in: Some(3600),
            user: AuthUser {
                id: user_id.to_string(),
                email: Some(email.to_string()),
            },
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), IdentityError> {
        Ok(())
    }
}

/// The full router over memory stores, with handles on the stores so tests
/// can check what was (or was not) written.
pub struct TestApp {
    pub router: Router,
    pub settings: Arc<MemorySettingsStore>,
    pub projects: Arc<MemoryProjectStore>,
    pub storage: Arc<MemoryObjectStorage>,
    pub owner_token: String,
    pub visitor_token: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_auth(auth_settings())
    }

    /// Same memory stores and tokens, different server-side auth settings.
    pub fn with_auth(auth: AuthSettings) -> Self {
        let settings = Arc::new(MemorySettingsStore::new());
        let projects = Arc::new(MemoryProjectStore::new());
        let storage = Arc::new(MemoryObjectStorage::new("http://storage.test"));

        let stores = Stores {
            settings: settings.clone(),
            projects: projects.clone(),
            storage: storage.clone(),
        };
        let state = AppState::new(
            stores,
            Some(Arc::new(StubIdentity)),
            auth,
            BUCKET,
            FILE_SIZE_LIMIT,
        );

        Self {
            router: app(state, &HttpOptions::default()),
            settings,
            projects,
            storage,
            owner_token: token_for(OWNER_ID, OWNER_EMAIL),
            visitor_token: token_for("visitor-id", VISITOR_EMAIL),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read")
            .to_vec();
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::get(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).expect("request builds")).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &Value) -> TestResponse {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).expect("request builds"))
            .await
    }

    pub async fn post_multipart(&self, uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> TestResponse {
        let (content_type, body) = multipart_body(parts);
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body)).expect("request builds")).await
    }

    pub async fn owner_post(&self, uri: &str, body: &Value) -> TestResponse {
        self.post_json(uri, Some(&self.owner_token), body).await
    }
}

/// Router whose settings and project stores fail every call, as a dropped
/// database connection would.
pub fn failing_store_app() -> TestApp {
    let mut test_app = TestApp::new();
    let stores = Stores {
        settings: Arc::new(FailingSettingsStore),
        projects: Arc::new(FailingProjectStore),
        storage: test_app.storage.clone(),
    };
    let state = AppState::new(stores, Some(Arc::new(StubIdentity)), auth_settings(), BUCKET, FILE_SIZE_LIMIT);
    test_app.router = app(state, &HttpOptions::default());
    test_app
}

pub const STORE_FAILURE: &str = "relation does not exist";

fn store_failure() -> StoreError {
    StoreError::Sqlx(sqlx::Error::Protocol(STORE_FAILURE.to_string()))
}

pub struct FailingSettingsStore;

#[async_trait]
impl SettingsStore for FailingSettingsStore {
    async fn all(&self) -> Result<Vec<Setting>, StoreError> {
        Err(store_failure())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Err(store_failure())
    }

    async fn get(&self, _key: &str) -> Result<Option<Setting>, StoreError> {
        Err(store_failure())
    }

    async fn upsert(&self, _entries: &[(String, String)]) -> Result<Vec<Setting>, StoreError> {
        Err(store_failure())
    }

    async fn insert_missing(&self, _entries: &[(String, String)]) -> Result<Vec<Setting>, StoreError> {
        Err(store_failure())
    }
}

pub struct FailingProjectStore;

#[async_trait]
impl ProjectStore for FailingProjectStore {
    async fn list(&self, _filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        Err(store_failure())
    }

    async fn get(&self, _id: uuid::Uuid) -> Result<Option<Project>, StoreError> {
        Err(store_failure())
    }

    async fn get_by_slug(&self, _slug: &str) -> Result<Option<Project>, StoreError> {
        Err(store_failure())
    }

    async fn slugs_with_prefix(&self, _prefix: &str) -> Result<Vec<(uuid::Uuid, String)>, StoreError> {
        Err(store_failure())
    }

    async fn insert(&self, _project: NewProject) -> Result<Project, StoreError> {
        Err(store_failure())
    }

    async fn update(&self, _id: uuid::Uuid, _patch: ProjectPatch) -> Result<Option<Project>, StoreError> {
        Err(store_failure())
    }

    async fn delete(&self, _id: uuid::Uuid) -> Result<bool, StoreError> {
        Err(store_failure())
    }
}

/// One multipart form part.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            bytes: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, file_name: &'a str, content_type: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            name,
            file_name: Some(file_name),
            content_type: Some(content_type),
            bytes,
        }
    }
}

const BOUNDARY: &str = "portfolio-test-boundary";

pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

// Spawned binary, for the few tests that exercise startup and real sockets.

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_portfolio-api"));
        cmd.env("PORTFOLIO_API_PORT", port.to_string())
            .env("HOST", "127.0.0.1")
            .env("STORE_BACKEND", "memory")
            .env("OWNER_ID", OWNER_ID)
            .env("SESSION_JWT_SECRET", SECRET)
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
