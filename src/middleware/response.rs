use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success envelope: `{"success": true, "data": ..., ...extra}`.
///
/// `data` is omitted when there is none (deletes, uploads), and `extra`
/// carries top-level siblings such as a bulk `updated` count.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub extra: Map<String, Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response (200)
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            extra: Map::new(),
        }
    }

    /// Add a top-level field next to `success`/`data`.
    pub fn with_field(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.extra.insert(key.to_string(), value);
            }
            Err(e) => tracing::error!("Failed to serialize response field '{}': {}", key, e),
        }
        self
    }
}

impl ApiResponse<()> {
    /// `{"success": true}` with no data.
    pub fn empty() -> Self {
        Self {
            data: None,
            extra: Map::new(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = Map::new();
        envelope.insert("success".to_string(), Value::Bool(true));

        if let Some(data) = &self.data {
            match serde_json::to_value(data) {
                Ok(value) => {
                    envelope.insert("data".to_string(), value);
                }
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Failed to serialize response data" })),
                    )
                        .into_response();
                }
            }
        }

        for (key, value) in self.extra {
            envelope.entry(key).or_insert(value);
        }

        (StatusCode::OK, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
