pub mod blocks;
pub mod keys;

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};

pub use blocks::{
    parse_structured, validate_setting, Blocks, Capability, ContentError, ExperienceEntry, FooterLink,
    StructuredKey,
};
pub use keys::DEFAULT_SETTINGS;

/// The static default table as an owned map.
pub fn default_settings() -> BTreeMap<String, String> {
    DEFAULT_SETTINGS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn default_value(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Footer copy with `{year}` filled in.
pub fn footer_text(template: &str) -> String {
    template.replace("{year}", &Utc::now().year().to_string())
}
