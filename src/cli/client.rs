use std::path::Path;

use async_trait::async_trait;
use reqwest::{multipart, Method, RequestBuilder, StatusCode};
use serde_json::Value;

use super::config::{load_server_config, load_session_config};
use super::session::{LoginError, OwnerApi};

/// Thin reqwest wrapper over the portfolio HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Client for the configured server, carrying the stored token if any.
    pub fn from_config() -> anyhow::Result<Self> {
        let server = load_server_config()?;
        let session = load_session_config()?;
        Ok(Self::new(&server.url, session.access_token))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> anyhow::Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(anyhow::anyhow!("{}", error_message(status, &body)));
        }
        Ok(body)
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        Self::send(self.request(Method::GET, path)).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        Self::send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn upload(&self, file: &Path, folder: Option<&str>) -> anyhow::Result<Value> {
        let bytes = tokio::fs::read(file).await?;
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let mut form = multipart::Form::new().part("file", multipart::Part::bytes(bytes).file_name(name));
        if let Some(folder) = folder {
            form = form.text("folder", folder.to_string());
        }

        Self::send(self.request(Method::POST, "/api/storage/upload").multipart(form)).await
    }
}

/// `error` plus `details` from an error envelope, or the bare status.
pub fn error_message(status: StatusCode, body: &Value) -> String {
    let error = body.get("error").and_then(Value::as_str);
    let details = body.get("details").and_then(Value::as_str);
    match (error, details) {
        (Some(error), Some(details)) => format!("{}: {}", error, details),
        (Some(error), None) => error.to_string(),
        _ => format!("Request failed ({})", status),
    }
}

#[async_trait]
impl OwnerApi for ApiClient {
    async fn is_owner(&self, token: Option<&str>) -> anyhow::Result<bool> {
        let mut builder = self.http.get(format!("{}/api/auth/is-owner", self.base_url));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        let body = Self::send(builder).await?;
        Ok(body.get("isOwner").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String, LoginError> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| LoginError::Transport(e.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(LoginError::Rejected(error_message(status, &body)));
        }

        body.pointer("/data/access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| LoginError::Transport("response carried no access token".into()))
    }

    async fn sign_out(&self, token: &str) -> anyhow::Result<()> {
        let builder = self
            .http
            .post(format!("{}/auth/logout", self.base_url))
            .bearer_auth(token);
        Self::send(builder).await.map(|_| ())
    }
}
