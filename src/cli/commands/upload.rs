use std::path::PathBuf;

use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

pub async fn handle(file: PathBuf, folder: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    if !file.is_file() {
        return Err(anyhow::anyhow!("{} is not a file", file.display()));
    }

    let client = ApiClient::from_config()?;
    let body = client.upload(&file, folder.as_deref()).await?;

    let url = body.get("url").and_then(Value::as_str).unwrap_or_default();
    let path = body.get("path").and_then(Value::as_str).unwrap_or_default();
    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            "Uploaded",
            Some(json!({ "url": url, "path": path })),
        ),
        OutputFormat::Text => {
            println!("{}", url);
            Ok(())
        }
    }
}
