use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::html::{escape, safe_href};
use crate::content::keys;

/// A piece of owner-editable content bound to one or two setting keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableWidget {
    Text { key: &'static str, multiline: bool },
    Image { key: &'static str, upload: bool },
    Json { key: &'static str },
    Link { label_key: &'static str, href_key: &'static str },
}

/// What the owner typed into a widget's editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetDraft {
    Value(String),
    Link { label: String, href: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("{0} widgets take a label and a URL")]
    ExpectedLink(&'static str),

    #[error("{0} widgets take a single value")]
    ExpectedValue(&'static str),
}

/// Every widget the pages render.
pub const CATALOG: &[EditableWidget] = &[
    EditableWidget::Image { key: keys::NAVBAR_AVATAR_URL, upload: true },
    EditableWidget::Text { key: keys::HERO_HEADLINE, multiline: false },
    EditableWidget::Text { key: keys::HERO_SUBHEADLINE, multiline: true },
    EditableWidget::Link { label_key: keys::HERO_CTA1_LABEL, href_key: keys::HERO_CTA1_HREF },
    EditableWidget::Link { label_key: keys::HERO_CTA2_LABEL, href_key: keys::HERO_CTA2_HREF },
    EditableWidget::Text { key: keys::ABOUT_TITLE, multiline: false },
    EditableWidget::Text { key: keys::ABOUT_BODY, multiline: true },
    EditableWidget::Text { key: keys::CAPABILITIES_TITLE, multiline: false },
    EditableWidget::Text { key: keys::CAPABILITIES_SUBTITLE, multiline: false },
    EditableWidget::Json { key: keys::CAPABILITIES_JSON },
    EditableWidget::Text { key: keys::EXPERIENCE_TITLE, multiline: false },
    EditableWidget::Text { key: keys::EXPERIENCE_SUBTITLE, multiline: false },
    EditableWidget::Json { key: keys::EXPERIENCE_JSON },
    EditableWidget::Text { key: keys::CONTACT_TITLE, multiline: false },
    EditableWidget::Text { key: keys::CONTACT_SUBTITLE, multiline: true },
    EditableWidget::Text { key: keys::CONTACT_EMAIL, multiline: false },
    EditableWidget::Text { key: keys::GITHUB_URL, multiline: false },
    EditableWidget::Text { key: keys::LINKEDIN_URL, multiline: false },
    EditableWidget::Text { key: keys::X_URL, multiline: false },
    EditableWidget::Text { key: keys::FOOTER_TEXT, multiline: false },
    EditableWidget::Json { key: keys::FOOTER_LINKS_JSON },
    EditableWidget::Text { key: keys::SEO_TITLE, multiline: false },
    EditableWidget::Text { key: keys::SEO_DESCRIPTION, multiline: true },
];

impl EditableWidget {
    /// The catalog widget editing `key`, if any.
    pub fn for_key(key: &str) -> Option<EditableWidget> {
        CATALOG.iter().copied().find(|w| w.keys().contains(&key))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EditableWidget::Text { .. } => "text",
            EditableWidget::Image { .. } => "image",
            EditableWidget::Json { .. } => "json",
            EditableWidget::Link { .. } => "link",
        }
    }

    pub fn keys(&self) -> Vec<&'static str> {
        match *self {
            EditableWidget::Text { key, .. } | EditableWidget::Image { key, .. } | EditableWidget::Json { key } => {
                vec![key]
            }
            EditableWidget::Link { label_key, href_key } => vec![label_key, href_key],
        }
    }

    /// Visitors get the stored value as content; the owner also gets the
    /// attributes the browser script hooks its editor onto.
    pub fn render(&self, settings: &BTreeMap<String, String>, is_owner: bool) -> String {
        let value = |key: &str| settings.get(key).map(String::as_str).unwrap_or_default();

        match *self {
            EditableWidget::Text { key, multiline } => {
                text_with_display(key, multiline, value(key), value(key), is_owner)
            }
            EditableWidget::Image { key, upload } => {
                let src = value(key);
                let img = if src.trim().is_empty() {
                    String::new()
                } else {
                    format!("<img src=\"{}\" alt=\"\">", safe_href(src))
                };
                if !is_owner {
                    return img;
                }
                let inner = if img.is_empty() { "Add image".to_string() } else { img };
                format!(
                    "<span class=\"editable\" data-widget=\"image\" data-setting-key=\"{}\" data-upload=\"{}\" data-value=\"{}\">{}</span>",
                    key,
                    upload,
                    escape(src),
                    inner
                )
            }
            EditableWidget::Json { key } => {
                if !is_owner {
                    return String::new();
                }
                format!(
                    "<button type=\"button\" class=\"editable\" data-widget=\"json\" data-setting-key=\"{}\" data-value=\"{}\">Edit {}</button>",
                    key,
                    escape(value(key)),
                    key
                )
            }
            EditableWidget::Link { label_key, href_key } => {
                let (label, href) = (value(label_key), value(href_key));
                let anchor = if label.is_empty() && href.is_empty() {
                    String::new()
                } else {
                    format!("<a href=\"{}\">{}</a>", safe_href(href), escape(label))
                };
                if !is_owner {
                    return anchor;
                }
                format!(
                    "<span class=\"editable\" data-widget=\"link\" data-label-key=\"{}\" data-href-key=\"{}\" data-label=\"{}\" data-href=\"{}\">{}</span>",
                    label_key,
                    href_key,
                    escape(label),
                    escape(href),
                    anchor
                )
            }
        }
    }

    /// Body for `POST /api/settings/update` saving `draft`. JSON drafts must
    /// parse first so a broken blob never reaches the endpoint.
    pub fn save_request(&self, draft: &WidgetDraft) -> Result<Value, WidgetError> {
        let mut updates = Map::new();

        match (*self, draft) {
            (EditableWidget::Json { key }, WidgetDraft::Value(text)) => {
                serde_json::from_str::<Value>(text).map_err(|_| WidgetError::InvalidJson)?;
                updates.insert(key.to_string(), Value::String(text.clone()));
            }
            (EditableWidget::Text { key, .. } | EditableWidget::Image { key, .. }, WidgetDraft::Value(text)) => {
                updates.insert(key.to_string(), Value::String(text.clone()));
            }
            (EditableWidget::Link { label_key, href_key }, WidgetDraft::Link { label, href }) => {
                updates.insert(label_key.to_string(), Value::String(label.clone()));
                updates.insert(href_key.to_string(), Value::String(href.clone()));
            }
            (EditableWidget::Link { .. }, WidgetDraft::Value(_)) => {
                return Err(WidgetError::ExpectedLink(self.kind()));
            }
            (_, WidgetDraft::Link { .. }) => return Err(WidgetError::ExpectedValue(self.kind())),
        }

        Ok(json!({ "updates": updates }))
    }
}

/// Text widget whose shown content differs from the stored value (e.g. the
/// footer's `{year}` placeholder). The editor is seeded with `raw`.
pub fn text_with_display(key: &str, multiline: bool, raw: &str, display: &str, is_owner: bool) -> String {
    let content = if multiline {
        escape(display).replace('\n', "<br>")
    } else {
        escape(display)
    };
    if !is_owner {
        return content;
    }
    format!(
        "<span class=\"editable\" data-widget=\"text\" data-setting-key=\"{}\" data-multiline=\"{}\" data-value=\"{}\">{}</span>",
        key,
        multiline,
        escape(raw),
        content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn visitors_see_plain_escaped_text() {
        let widget = EditableWidget::Text { key: keys::HERO_HEADLINE, multiline: false };
        let html = widget.render(&settings(&[(keys::HERO_HEADLINE, "Hi <there>")]), false);
        assert_eq!(html, "Hi &lt;there&gt;");
    }

    #[test]
    fn owner_gets_edit_affordance() {
        let widget = EditableWidget::Text { key: keys::ABOUT_BODY, multiline: true };
        let html = widget.render(&settings(&[(keys::ABOUT_BODY, "a\nb")]), true);
        assert!(html.contains("data-widget=\"text\""));
        assert!(html.contains("data-setting-key=\"about_body\""));
        assert!(html.contains(">a<br>b</span>"));
    }

    #[test]
    fn json_widgets_are_invisible_to_visitors() {
        let widget = EditableWidget::Json { key: keys::EXPERIENCE_JSON };
        assert_eq!(widget.render(&settings(&[(keys::EXPERIENCE_JSON, "[]")]), false), "");
        assert!(widget.render(&settings(&[]), true).contains("data-widget=\"json\""));
    }

    #[test]
    fn links_render_anchor_for_visitors() {
        let widget = EditableWidget::Link { label_key: keys::HERO_CTA1_LABEL, href_key: keys::HERO_CTA1_HREF };
        let html = widget.render(
            &settings(&[(keys::HERO_CTA1_LABEL, "View"), (keys::HERO_CTA1_HREF, "/projects")]),
            false,
        );
        assert_eq!(html, "<a href=\"/projects\">View</a>");
    }

    #[test]
    fn invalid_json_draft_never_builds_a_request() {
        let widget = EditableWidget::Json { key: keys::CAPABILITIES_JSON };
        assert_eq!(
            widget.save_request(&WidgetDraft::Value("[{".into())),
            Err(WidgetError::InvalidJson)
        );
        let body = widget.save_request(&WidgetDraft::Value("[]".into())).unwrap();
        assert_eq!(body, json!({"updates": {"capabilities_json": "[]"}}));
    }

    #[test]
    fn link_saves_both_keys_in_one_request() {
        let widget = EditableWidget::Link { label_key: keys::HERO_CTA2_LABEL, href_key: keys::HERO_CTA2_HREF };
        let body = widget
            .save_request(&WidgetDraft::Link {
                label: "Hire me".into(),
                href: "#contact".into(),
            })
            .unwrap();
        assert_eq!(
            body,
            json!({"updates": {"hero_cta2_label": "Hire me", "hero_cta2_href": "#contact"}})
        );
        assert!(widget.save_request(&WidgetDraft::Value("x".into())).is_err());
    }

    #[test]
    fn catalog_covers_every_default_key() {
        for (key, _) in crate::content::DEFAULT_SETTINGS {
            assert!(EditableWidget::for_key(key).is_some(), "no widget for {}", key);
        }
    }
}
