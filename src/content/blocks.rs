use serde::{Deserialize, Serialize};

use super::keys;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterLink {
    pub label: String,
    pub href: String,
}

/// Setting keys whose value is a JSON list of one of the block types above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredKey {
    Capabilities,
    Experience,
    FooterLinks,
}

impl StructuredKey {
    pub fn for_key(key: &str) -> Option<Self> {
        match key {
            keys::CAPABILITIES_JSON => Some(Self::Capabilities),
            keys::EXPERIENCE_JSON => Some(Self::Experience),
            keys::FOOTER_LINKS_JSON => Some(Self::FooterLinks),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Capabilities => keys::CAPABILITIES_JSON,
            Self::Experience => keys::EXPERIENCE_JSON,
            Self::FooterLinks => keys::FOOTER_LINKS_JSON,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid JSON for '{key}': {reason}")]
pub struct ContentError {
    pub key: String,
    pub reason: String,
}

/// Parsed form of a structured setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocks {
    Capabilities(Vec<Capability>),
    Experience(Vec<ExperienceEntry>),
    FooterLinks(Vec<FooterLink>),
}

/// Parse the JSON text stored under a structured key. Blank text is an empty list.
pub fn parse_structured(kind: StructuredKey, value: &str) -> Result<Blocks, ContentError> {
    let text = if value.trim().is_empty() { "[]" } else { value };
    let err = |e: serde_json::Error| ContentError {
        key: kind.key().to_string(),
        reason: e.to_string(),
    };

    Ok(match kind {
        StructuredKey::Capabilities => Blocks::Capabilities(serde_json::from_str(text).map_err(err)?),
        StructuredKey::Experience => Blocks::Experience(serde_json::from_str(text).map_err(err)?),
        StructuredKey::FooterLinks => Blocks::FooterLinks(serde_json::from_str(text).map_err(err)?),
    })
}

/// Reject a write whose value would not parse for its key. Plain keys always pass.
pub fn validate_setting(key: &str, value: &str) -> Result<(), ContentError> {
    match StructuredKey::for_key(key) {
        Some(kind) => parse_structured(kind, value).map(|_| ()),
        None => Ok(()),
    }
}

/// Readers never fail on a bad blob; they render an empty section instead.
fn parse_or_empty<T>(kind: StructuredKey, value: &str, pick: impl FnOnce(Blocks) -> Option<Vec<T>>) -> Vec<T> {
    match parse_structured(kind, value) {
        Ok(blocks) => pick(blocks).unwrap_or_default(),
        Err(e) => {
            tracing::warn!("{}", e);
            Vec::new()
        }
    }
}

pub fn capabilities(value: &str) -> Vec<Capability> {
    parse_or_empty(StructuredKey::Capabilities, value, |b| match b {
        Blocks::Capabilities(v) => Some(v),
        _ => None,
    })
}

pub fn experience(value: &str) -> Vec<ExperienceEntry> {
    parse_or_empty(StructuredKey::Experience, value, |b| match b {
        Blocks::Experience(v) => Some(v),
        _ => None,
    })
}

pub fn footer_links(value: &str) -> Vec<FooterLink> {
    parse_or_empty(StructuredKey::FooterLinks, value, |b| match b {
        Blocks::FooterLinks(v) => Some(v),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::default_settings;

    #[test]
    fn defaults_parse_into_typed_blocks() {
        let defaults = default_settings();
        assert_eq!(capabilities(&defaults[keys::CAPABILITIES_JSON]).len(), 4);
        assert_eq!(experience(&defaults[keys::EXPERIENCE_JSON]).len(), 2);
        let links = footer_links(&defaults[keys::FOOTER_LINKS_JSON]);
        assert_eq!(links[0].label, "GitHub");
    }

    #[test]
    fn structured_keys_reject_malformed_json() {
        assert!(validate_setting(keys::EXPERIENCE_JSON, "[{").is_err());
        assert!(validate_setting(keys::FOOTER_LINKS_JSON, r#"[{"label":"x"}]"#).is_err());
        assert!(validate_setting(keys::CAPABILITIES_JSON, r#"[{"title":"A"}]"#).is_ok());
        assert!(validate_setting(keys::CAPABILITIES_JSON, "").is_ok());
    }

    #[test]
    fn plain_keys_accept_anything() {
        assert!(validate_setting(keys::HERO_HEADLINE, "[{ not json").is_ok());
    }

    #[test]
    fn readers_fall_back_to_empty() {
        assert!(experience("{oops").is_empty());
    }
}
