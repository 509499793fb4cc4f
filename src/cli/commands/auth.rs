use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::*;
use crate::cli::session::{OwnerSession, SessionState};
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout from server")]
    Logout,

    #[command(about = "Ask the server whether the stored session is the owner")]
    Status,
}

fn state_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Owner => "owner",
        SessionState::Visitor => "visitor",
        SessionState::Checking => "checking",
        SessionState::Unauthenticated => "signed out",
    }
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let server = load_server_config()?;
    let stored = load_session_config()?;
    let mut session = OwnerSession::new(ApiClient::new(&server.url, None), stored.access_token.clone());

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password")?,
            };

            session.open_login();
            let state = session.login(&email, &password).await?;

            save_session_config(&SessionConfig {
                access_token: session.token().map(str::to_string),
                email: Some(email.clone()),
                signed_in_at: Some(Utc::now()),
            })?;

            if state != SessionState::Owner {
                tracing::warn!("{} signed in but is not the site owner", email);
            }
            output_success(
                &output_format,
                &format!("Signed in as {} ({})", email, state_label(state)),
                Some(json!({ "email": email, "isOwner": state == SessionState::Owner })),
            )
        }
        AuthCommands::Logout => {
            session.logout().await;
            save_session_config(&SessionConfig::default())?;
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Status => {
            let state = if session.token().is_some() {
                session.refresh().await
            } else {
                SessionState::Unauthenticated
            };
            let email = stored.email.unwrap_or_default();

            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "server": server.url,
                        "email": email,
                        "state": state_label(state),
                        "isOwner": state == SessionState::Owner,
                    }))?
                ),
                OutputFormat::Text => {
                    println!("Server: {}", server.url);
                    if !email.is_empty() {
                        println!("Email: {}", email);
                    }
                    println!("Session: {}", state_label(state));
                }
            }
            Ok(())
        }
    }
}
