use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Subject id of the single site owner. `None` fails every owner check closed.
    pub owner_id: Option<String>,
    #[serde(skip_serializing)]
    pub session_secret: String,
    pub session_audience: String,
    pub session_ttl_hours: u64,
    pub session_cookie: String,
    pub secure_cookies: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub url: Option<String>,
    #[serde(skip_serializing)]
    pub anon_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub url: Option<String>,
    #[serde(skip_serializing)]
    pub service_key: Option<String>,
    pub bucket: String,
    pub file_size_limit_bytes: u64,
}

/// Startup checks that keep a misconfigured server from accepting sessions.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SESSION_JWT_SECRET must be set when STORE_BACKEND is postgres")]
    MissingSessionSecret,
}

impl AppConfig {
    /// There is no built-in signing secret. A persistent store refuses to
    /// start without one; the memory backend starts, but every session
    /// check fails until a secret is supplied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.session_secret.is_empty() && self.database.backend == StoreBackend::Postgres {
            return Err(ConfigError::MissingSessionSecret);
        }
        Ok(())
    }

    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("PORTFOLIO_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "memory" | "mem" => StoreBackend::Memory,
                _ => StoreBackend::Postgres,
            };
        }
        self.database.url = non_empty_var("DATABASE_URL").or(self.database.url);
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        self.security.owner_id = non_empty_var("OWNER_ID");
        if let Some(v) = non_empty_var("SESSION_JWT_SECRET") {
            self.security.session_secret = v;
        }
        if let Some(v) = non_empty_var("SESSION_AUDIENCE") {
            self.security.session_audience = v;
        }
        if let Ok(v) = env::var("SESSION_TTL_HOURS") {
            self.security.session_ttl_hours = v.parse().unwrap_or(self.security.session_ttl_hours);
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Identity provider overrides
        self.identity.url = non_empty_var("IDENTITY_URL").or(self.identity.url);
        self.identity.anon_key = non_empty_var("IDENTITY_ANON_KEY").or(self.identity.anon_key);

        // Object storage overrides
        self.storage.url = non_empty_var("STORAGE_URL")
            .or_else(|| self.identity.url.clone())
            .or(self.storage.url);
        self.storage.service_key = non_empty_var("STORAGE_SERVICE_KEY").or(self.storage.service_key);
        if let Some(v) = non_empty_var("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Ok(v) = env::var("STORAGE_FILE_SIZE_LIMIT_BYTES") {
            self.storage.file_size_limit_bytes = v.parse().unwrap_or(self.storage.file_size_limit_bytes);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                max_request_size_bytes: 12 * 1024 * 1024, // 12MB
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                owner_id: None,
                session_secret: String::new(),
                session_audience: "authenticated".to_string(),
                session_ttl_hours: 24 * 7, // 1 week
                session_cookie: "portfolio_session".to_string(),
                secure_cookies: false,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            identity: IdentityConfig {
                url: None,
                anon_key: None,
            },
            storage: StorageConfig {
                url: None,
                service_key: None,
                bucket: "site-assets".to_string(),
                file_size_limit_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::production();
        config.environment = Environment::Staging;
        config.server.enable_request_logging = true;
        config.database.max_connections = 5;
        config.security.session_ttl_hours = 24;
        config
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_request_size_bytes: 12 * 1024 * 1024, // 12MB
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                owner_id: None,
                // No fallback secret: without SESSION_JWT_SECRET no session verifies.
                session_secret: String::new(),
                session_audience: "authenticated".to_string(),
                session_ttl_hours: 4,
                session_cookie: "portfolio_session".to_string(),
                secure_cookies: true,
                cors_origins: Vec::new(),
            },
            identity: IdentityConfig {
                url: None,
                anon_key: None,
            },
            storage: StorageConfig {
                url: None,
                service_key: None,
                bucket: "site-assets".to_string(),
                file_size_limit_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
