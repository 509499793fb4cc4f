use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    pub added_at: DateTime<Utc>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

/// The access token from the last login. Whether it belongs to the owner is
/// never stored; it is asked of the server each time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub access_token: Option<String>,
    pub email: Option<String>,
    pub signed_in_at: Option<DateTime<Utc>>,
}

impl ServerConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            added_at: Utc::now(),
            last_ping: None,
            status: ServerStatus::Unknown,
        }
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("PORTFOLIO_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("portfolio").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

fn load<T: DeserializeOwned + Default>(file_name: &str) -> anyhow::Result<T> {
    let file = get_config_dir()?.join(file_name);
    if !file.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(file)?;
    Ok(serde_json::from_str(&content)?)
}

fn save<T: Serialize>(file_name: &str, value: &T) -> anyhow::Result<()> {
    let file = get_config_dir()?.join(file_name);
    let content = serde_json::to_string_pretty(value)?;
    fs::write(file, content)?;
    Ok(())
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    load("server.json")
}

pub fn save_server_config(config: &ServerConfig) -> anyhow::Result<()> {
    save("server.json", config)
}

pub fn load_session_config() -> anyhow::Result<SessionConfig> {
    load("session.json")
}

pub fn save_session_config(config: &SessionConfig) -> anyhow::Result<()> {
    save("session.json", config)
}
