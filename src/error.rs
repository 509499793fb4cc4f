// HTTP API Error Types
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::database::StoreError;
use crate::identity::IdentityError;
use crate::services::{AssetError, ProjectError, SettingsError};

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Bodies are always `{"error": message}`, with `"details"` carrying the
/// underlying store or storage message on 500s.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError {
        message: String,
        details: String,
    },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::InternalServerError { .. } => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::InternalServerError { message, details } => {
                json!({ "error": message, "details": details })
            }
            _ => json!({ "error": self.message() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// 500 carrying the underlying failure as `details`. Logs the failure.
    pub fn failed(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let message = message.into();
        let details = cause.to_string();
        tracing::error!("{}: {}", message, details);
        ApiError::InternalServerError {
            message,
            details,
        }
    }

    /// Store failure for a specific operation. Unique-key violations become 409.
    pub fn store(message: impl Into<String>, err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            other => ApiError::failed(message, other),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::store("Database error", err)
    }
}

// Service failures, with the operation-specific message used for 500s
impl ApiError {
    pub fn project(context: &str, err: ProjectError) -> Self {
        match err {
            ProjectError::Validation(msg) => ApiError::bad_request(msg),
            ProjectError::NotFound(msg) => ApiError::not_found(msg),
            ProjectError::Store(e) => ApiError::store(context, e),
        }
    }

    pub fn settings(context: &str, err: SettingsError) -> Self {
        match err {
            SettingsError::Validation(msg) => ApiError::bad_request(msg),
            SettingsError::Store(e) => ApiError::store(context, e),
        }
    }
}

impl From<AssetError> for ApiError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::TooLarge { .. } => ApiError::payload_too_large(err.to_string()),
            AssetError::InvalidFolder(_) => ApiError::bad_request(err.to_string()),
            AssetError::Bucket(e) => ApiError::failed("Failed to initialize storage bucket", e),
            AssetError::Upload(e) => ApiError::failed("Upload failed", e),
            AssetError::PublicUrl => ApiError::failed("Failed to get public URL", "storage returned no URL"),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials(msg) => ApiError::unauthorized(msg),
            IdentityError::NotConfigured => {
                ApiError::service_unavailable("Identity provider is not configured")
            }
            other => {
                tracing::error!("Identity provider error: {}", other);
                ApiError::service_unavailable("Identity provider unavailable")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

/// `Json<T>` whose rejection is an `ApiError` 400 instead of axum's plain-text body.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}
