use serde::Serialize;

use super::Session;

pub const NO_SESSION: &str = "Unauthorized - no valid session";
pub const SERVER_MISCONFIGURED: &str = "Server configuration error";
pub const NOT_OWNER: &str = "Forbidden - not the site owner";

/// Result of comparing a request's session against the configured owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerCheck {
    pub is_owner: bool,
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OwnerCheck {
    fn denied(user_id: Option<String>, error: &str) -> Self {
        Self {
            is_owner: false,
            user_id,
            error: Some(error.to_string()),
        }
    }
}

/// Decide whether `session` belongs to the site owner.
///
/// Rules apply in order: no session, missing owner configuration (fail
/// closed), subject mismatch, owner. Runs on every mutating request.
pub fn verify_owner(session: Option<&Session>, owner_id: Option<&str>) -> OwnerCheck {
    let Some(session) = session else {
        return OwnerCheck::denied(None, NO_SESSION);
    };

    let owner_id = match owner_id.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => {
            tracing::error!("OWNER_ID is not configured; refusing owner access");
            return OwnerCheck::denied(Some(session.user_id.clone()), SERVER_MISCONFIGURED);
        }
    };

    if session.user_id != owner_id {
        return OwnerCheck::denied(Some(session.user_id.clone()), NOT_OWNER);
    }

    OwnerCheck {
        is_owner: true,
        user_id: Some(session.user_id.clone()),
        error: None,
    }
}
