use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{verify_session_token, Session, SessionError};
use crate::config::{AppConfig, SecurityConfig, StoreBackend};
use crate::database::{
    DatabaseManager, MemoryProjectStore, MemorySettingsStore, PgProjectStore, PgSettingsStore, ProjectStore,
    SettingsStore,
};
use crate::handlers;
use crate::identity::{HttpIdentityProvider, IdentityProvider};
use crate::services::{AssetService, ProjectService, SettingsService};
use crate::storage::{DisabledStorage, HttpObjectStorage, MemoryObjectStorage, ObjectStorage};

/// Session verification settings and the owner identity, read once at startup.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub owner_id: Option<String>,
    pub session_secret: String,
    pub audience: String,
    pub cookie_name: String,
    pub secure_cookies: bool,
    pub session_ttl_hours: u64,
}

impl AuthSettings {
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self {
            owner_id: security.owner_id.clone(),
            session_secret: security.session_secret.clone(),
            audience: security.session_audience.clone(),
            cookie_name: security.session_cookie.clone(),
            secure_cookies: security.secure_cookies,
            session_ttl_hours: security.session_ttl_hours,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        verify_session_token(token, &self.session_secret, &self.audience)
    }

    /// `Set-Cookie` value carrying the access token.
    pub fn session_cookie(&self, token: &str, max_age_secs: u64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name, token, max_age_secs
        );
        if self.secure_cookies {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn clear_cookie(&self) -> String {
        self.session_cookie("", 0)
    }

    pub fn session_max_age(&self) -> u64 {
        self.session_ttl_hours * 3600
    }
}

/// Backends behind the services.
pub struct Stores {
    pub settings: Arc<dyn SettingsStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            settings: Arc::new(MemorySettingsStore::new()),
            projects: Arc::new(MemoryProjectStore::new()),
            storage: Arc::new(MemoryObjectStorage::default()),
        }
    }
}

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<SettingsService>,
    pub projects: Arc<ProjectService>,
    pub assets: Arc<AssetService>,
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub auth: Arc<AuthSettings>,
    store_health: Arc<dyn SettingsStore>,
}

impl AppState {
    pub fn new(
        stores: Stores,
        identity: Option<Arc<dyn IdentityProvider>>,
        auth: AuthSettings,
        bucket: impl Into<String>,
        file_size_limit: u64,
    ) -> Self {
        Self {
            settings: Arc::new(SettingsService::new(stores.settings.clone())),
            projects: Arc::new(ProjectService::new(stores.projects)),
            assets: Arc::new(AssetService::new(stores.storage, bucket, file_size_limit)),
            identity,
            auth: Arc::new(auth),
            store_health: stores.settings,
        }
    }

    /// Build stores and clients from configuration. Returns the pool owner too
    /// so the caller can close it on shutdown.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<(Self, Option<DatabaseManager>)> {
        let (mut stores, manager) = match config.database.backend {
            StoreBackend::Postgres => {
                let manager = DatabaseManager::connect(&config.database).await?;
                if config.database.run_migrations {
                    manager.migrate().await?;
                }
                let stores = Stores {
                    settings: Arc::new(PgSettingsStore::new(manager.pool())),
                    projects: Arc::new(PgProjectStore::new(manager.pool())),
                    storage: Arc::new(DisabledStorage),
                };
                (stores, Some(manager))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory stores; content is lost on restart");
                (Stores::memory(), None)
            }
        };

        match (&config.storage.url, &config.storage.service_key) {
            (Some(url), Some(key)) => {
                stores.storage = Arc::new(HttpObjectStorage::new(url, key.clone())?);
            }
            _ if manager.is_some() => {
                tracing::warn!("STORAGE_URL/STORAGE_SERVICE_KEY not set; uploads are disabled");
            }
            _ => {}
        }

        let identity: Option<Arc<dyn IdentityProvider>> = match (&config.identity.url, &config.identity.anon_key) {
            (Some(url), Some(key)) => Some(Arc::new(HttpIdentityProvider::new(url.clone(), key.clone()))),
            _ => {
                tracing::warn!("IDENTITY_URL/IDENTITY_ANON_KEY not set; /auth/login is unavailable");
                None
            }
        };

        if config.security.owner_id.is_none() {
            tracing::warn!("OWNER_ID is not set; every owner check will fail");
        }

        let state = Self::new(
            stores,
            identity,
            AuthSettings::from_config(&config.security),
            config.storage.bucket.clone(),
            config.storage.file_size_limit_bytes,
        );
        Ok((state, manager))
    }

    pub async fn store_health(&self) -> Result<(), crate::database::StoreError> {
        self.store_health.health_check().await
    }
}

/// Options for the HTTP stack around the routes.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub cors_origins: Vec<String>,
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

impl HttpOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cors_origins: config.security.cors_origins.clone(),
            max_request_size_bytes: config.server.max_request_size_bytes,
            enable_request_logging: config.server.enable_request_logging,
        }
    }
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            max_request_size_bytes: 12 * 1024 * 1024,
            enable_request_logging: false,
        }
    }
}

pub fn app(state: AppState, options: &HttpOptions) -> Router {
    let router = Router::new()
        // Public
        .route("/health", get(handlers::public::health))
        .merge(site_routes())
        .merge(content_routes())
        .merge(auth_public_routes())
        // Owner only
        .merge(project_routes())
        .merge(settings_routes())
        .merge(storage_routes())
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(cors_layer(&options.cors_origins))
                .layer(DefaultBodyLimit::max(options.max_request_size_bytes)),
        );

    let router = if options.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn site_routes() -> Router<AppState> {
    use handlers::public::pages;

    Router::new()
        .route("/", get(pages::home))
        .route("/projects", get(pages::projects))
        .route("/contact", get(pages::contact))
        .route("/assets/owner.js", get(pages::owner_script))
}

fn content_routes() -> Router<AppState> {
    use handlers::public::content;

    Router::new()
        .route("/api", get(handlers::public::root))
        .route("/api/settings", get(content::settings_get))
        .route("/api/projects", get(content::projects_list))
        .route("/api/projects/:slug", get(content::project_get))
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/is-owner", get(auth::is_owner))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
}

fn project_routes() -> Router<AppState> {
    use handlers::protected::projects;

    Router::new()
        .route("/api/projects/create", post(projects::create))
        .route("/api/projects/update", post(projects::update))
        .route("/api/projects/delete", post(projects::delete))
}

fn settings_routes() -> Router<AppState> {
    use handlers::protected::settings;

    Router::new()
        .route("/api/settings/update", post(settings::update))
        .route("/api/settings/ensure", post(settings::ensure))
}

fn storage_routes() -> Router<AppState> {
    use handlers::protected::storage;

    Router::new().route("/api/storage/upload", post(storage::upload))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if origins.is_empty() {
        return CorsLayer::new();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}
