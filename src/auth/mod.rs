pub mod owner;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub use owner::{verify_owner, OwnerCheck};

/// Access-token claims as issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, email: Option<String>, audience: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.into(),
            email,
            aud: audience.to_string(),
            role: Some("authenticated".to_string()),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// A verified identity-provider session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub access_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session secret not configured")]
    MissingSecret,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Session token generation failed: {0}")]
    TokenGeneration(String),
}

/// Verify an access token and turn its claims into a [`Session`].
pub fn verify_session_token(token: &str, secret: &str, audience: &str) -> Result<Session, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.set_audience(&[audience]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| SessionError::InvalidToken(e.to_string()))?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(SessionError::InvalidToken("empty subject".to_string()));
    }

    Ok(Session {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
        access_token: token.to_string(),
    })
}

/// Sign a token the same way the identity provider does. Used by local runs and tests.
pub fn issue_session_token(claims: &Claims, secret: &str) -> Result<String, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| SessionError::TokenGeneration(e.to_string()))
}
