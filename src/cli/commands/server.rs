use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at a server")]
    Set {
        #[arg(help = "Server URL")]
        url: String,
    },

    #[command(about = "Show the configured server")]
    Show,

    #[command(about = "Check server health status from API /health endpoint")]
    Health,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url } => {
            url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;

            let config = ServerConfig::new(&url);
            save_server_config(&config)?;

            // A token issued by another server means nothing here.
            save_session_config(&SessionConfig::default())?;

            output_success(
                &output_format,
                &format!("Server set to {}", config.url),
                Some(json!({ "url": config.url })),
            )
        }
        ServerCommands::Show => {
            let config = load_server_config()?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Text => {
                    println!("URL: {}", config.url);
                    println!("Status: {:?}", config.status);
                    if let Some(ping) = config.last_ping {
                        println!("Last ping: {}", ping.format("%Y-%m-%d %H:%M"));
                    }
                }
            }
            Ok(())
        }
        ServerCommands::Health => {
            let mut config = load_server_config()?;
            let client = ApiClient::new(&config.url, None);

            let result = client.get("/health").await;
            config.update_ping(if result.is_ok() { ServerStatus::Up } else { ServerStatus::Down });
            save_server_config(&config)?;

            let body = result?;
            output_value(&output_format, &body, |body| {
                let status = body.pointer("/data/status").and_then(Value::as_str).unwrap_or("unknown");
                let database = body.pointer("/data/database").and_then(Value::as_str).unwrap_or("unknown");
                println!("{}: {} (database: {})", config.url, status, database);
            })
        }
    }
}
