use std::path::PathBuf;

use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::site::{EditableWidget, WidgetDraft};

#[derive(Subcommand)]
pub enum SettingsCommands {
    #[command(about = "Show every setting, or one")]
    Get {
        #[arg(help = "Setting key")]
        key: Option<String>,
    },

    #[command(about = "Set one setting (JSON settings are validated before sending)")]
    Set {
        #[arg(help = "Setting key")]
        key: String,
        #[arg(help = "New value")]
        value: String,
    },

    #[command(about = "Set a label/URL pair in one request")]
    Link {
        #[arg(help = "Label setting key, e.g. hero_cta1_label")]
        label_key: String,
        #[arg(long, help = "Link label")]
        label: String,
        #[arg(long, help = "Link URL")]
        href: String,
    },

    #[command(about = "Apply a JSON object of key/value updates from a file")]
    Bulk {
        #[arg(help = "Path to a JSON object file")]
        file: PathBuf,
    },

    #[command(about = "Insert any missing default settings")]
    Ensure,
}

/// Request body for `settings set`: catalog keys go through their widget,
/// anything else is sent as a plain single-key update.
pub fn set_request(key: &str, value: &str) -> anyhow::Result<Value> {
    match EditableWidget::for_key(key) {
        Some(widget @ EditableWidget::Link { .. }) => Err(anyhow::anyhow!(
            "'{}' is part of a {} widget; use `settings link` to set its label and URL together",
            key,
            widget.kind()
        )),
        Some(widget) => Ok(widget.save_request(&WidgetDraft::Value(value.to_string()))?),
        None => Ok(json!({ "key": key, "value": value })),
    }
}

pub fn link_request(label_key: &str, label: &str, href: &str) -> anyhow::Result<Value> {
    match EditableWidget::for_key(label_key) {
        Some(widget @ EditableWidget::Link { .. }) => Ok(widget.save_request(&WidgetDraft::Link {
            label: label.to_string(),
            href: href.to_string(),
        })?),
        _ => Err(anyhow::anyhow!("'{}' is not a link setting", label_key)),
    }
}

pub async fn handle(cmd: SettingsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::from_config()?;

    match cmd {
        SettingsCommands::Get { key } => {
            let body = client.get("/api/settings").await?;
            let settings = body.get("data").cloned().unwrap_or(Value::Null);

            match key {
                Some(key) => {
                    let value = settings
                        .get(&key)
                        .cloned()
                        .ok_or_else(|| anyhow::anyhow!("Setting '{}' not found", key))?;
                    output_value(&output_format, &json!({ key.clone(): value.clone() }), |_| {
                        println!("{}", value.as_str().unwrap_or_default());
                    })
                }
                None => output_value(&output_format, &settings, |settings| {
                    if let Some(map) = settings.as_object() {
                        for (key, value) in map {
                            println!("{:<24} {}", key, preview(value.as_str().unwrap_or_default(), 60));
                        }
                    }
                }),
            }
        }
        SettingsCommands::Set { key, value } => {
            let request = set_request(&key, &value)?;
            client.post("/api/settings/update", &request).await?;
            output_success(&output_format, &format!("Updated {}", key), Some(json!({ "key": key })))
        }
        SettingsCommands::Link { label_key, label, href } => {
            let request = link_request(&label_key, &label, &href)?;
            let body = client.post("/api/settings/update", &request).await?;
            output_success(&output_format, "Updated link", Some(json!({ "updated": body.get("updated") })))
        }
        SettingsCommands::Bulk { file } => {
            let content = tokio::fs::read_to_string(&file).await?;
            let updates: Value = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("{} is not valid JSON: {}", file.display(), e))?;
            if !updates.is_object() {
                return Err(anyhow::anyhow!("{} must contain a JSON object", file.display()));
            }

            let body = client.post("/api/settings/update", &json!({ "updates": updates })).await?;
            let updated = body.get("updated").and_then(Value::as_u64).unwrap_or(0);
            output_success(
                &output_format,
                &format!("Updated {} settings", updated),
                Some(json!({ "updated": updated })),
            )
        }
        SettingsCommands::Ensure => {
            let body = client.post("/api/settings/ensure", &json!({})).await?;
            let ensured = body.get("ensured").and_then(Value::as_u64).unwrap_or(0);
            output_success(
                &output_format,
                &format!("Inserted {} missing settings", ensured),
                Some(json!({ "ensured": ensured })),
            )
        }
    }
}
