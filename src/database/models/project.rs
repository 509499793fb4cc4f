use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub tech_stack: Vec<String>,
    pub featured: bool,
    pub slug: String,
    pub sort_order: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. `sort_order` is not part of it: featured projects get theirs
/// allocated by the store inside the insert.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub tech_stack: Vec<String>,
    pub featured: bool,
    pub slug: String,
}

/// Field overwrite for updates; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub slug: Option<String>,
    /// `Some(None)` clears the order.
    pub sort_order: Option<Option<i32>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFilter {
    pub featured: Option<bool>,
}

impl Project {
    /// Ordering used by listings: featured first (full listing only), then
    /// `sort_order` ascending with absent orders last, then newest first.
    pub fn listing_cmp(&self, other: &Self, featured_first: bool) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        if featured_first && self.featured != other.featured {
            return if self.featured { Ordering::Less } else { Ordering::Greater };
        }
        let by_order = match (self.sort_order, other.sort_order) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_order.then_with(|| other.created_at.cmp(&self.created_at))
    }
}
