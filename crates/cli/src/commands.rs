//! CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use railo_core::{FileStorage, Session, Settings, SystemClock};
use railo_http::{COOKIE_FILE_NAME, CookieJar, RailClient, RailClientBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the access token
    Login {
        /// Member number
        member_no: String,

        /// Password
        #[arg(long, env = "RAILO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Validate the stored session and show its state
    Status,

    /// Reissue the access token from the session cookie
    Refresh,

    /// List booking history
    Tickets,

    /// Show the receipt of a ticket
    Receipt {
        /// Ticket id
        ticket_id: i64,
    },

    /// List bookings awaiting payment
    Pending,

    /// Show operation dates open for booking
    Calendar,

    /// Show the logged-in member
    Member,

    /// Log out and clear the stored token
    Logout,

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate a default configuration file
    Init {
        /// Output file path (defaults to <data dir>/config.toml)
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    pub async fn execute(
        self,
        settings: &Settings,
        data_dir: &Path,
        ephemeral: bool,
    ) -> Result<()> {
        let command = match self {
            Commands::Config { command } => return command.execute(data_dir),
            command => command,
        };

        let jar = Arc::new(if ephemeral {
            CookieJar::in_memory()
        } else {
            CookieJar::open(data_dir.join(COOKIE_FILE_NAME))
                .context("Failed to open the cookie jar")?
        });
        let client = build_client(settings, data_dir, ephemeral, Arc::clone(&jar))?;

        let outcome = command.call(&client, &jar).await;
        if let Err(err) = jar.save() {
            warn!(error = %err, "Failed to save cookies; the next run may need to log in");
        }
        outcome
    }

    async fn call(self, client: &RailClient, jar: &CookieJar) -> Result<()> {
        match self {
            Commands::Login {
                member_no,
                password,
            } => {
                client.login(&member_no, &password).await?;
                print_session(client);
            }
            Commands::Status => {
                client.manager().initialize().await;
                print_session(client);
            }
            Commands::Refresh => {
                if !client.manager().reissue().refresh_tokens().await {
                    anyhow::bail!("Token reissue failed; log in again");
                }
                print_session(client);
            }
            Commands::Tickets => {
                ready(client).await;
                print_json(&client.tickets().await?)?;
            }
            Commands::Receipt { ticket_id } => {
                ready(client).await;
                print_json(&client.ticket_receipt(ticket_id).await?)?;
            }
            Commands::Pending => {
                ready(client).await;
                print_json(&client.pending_bookings().await?)?;
            }
            Commands::Calendar => {
                ready(client).await;
                print_json(&client.train_calendar().await?)?;
            }
            Commands::Member => {
                ready(client).await;
                print_json(&client.member_info().await?)?;
            }
            Commands::Logout => {
                if let Err(err) = client.logout().await {
                    warn!(error = %err, "Server rejected logout; local session cleared anyway");
                }
                jar.clear();
                println!("Logged out");
            }
            Commands::Config { .. } => anyhow::bail!("config commands do not talk to the API"),
        }
        Ok(())
    }
}

impl ConfigCommands {
    pub fn execute(self, data_dir: &Path) -> Result<()> {
        match self {
            ConfigCommands::Init { output, force } => {
                let path = output.unwrap_or_else(|| data_dir.join(config::CONFIG_FILE_NAME));
                config::generate_default_config(&path, force)?;
                info!("Generated configuration at {}", path.display());
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

fn build_client(
    settings: &Settings,
    data_dir: &Path,
    ephemeral: bool,
    jar: Arc<CookieJar>,
) -> Result<RailClient> {
    let session = if ephemeral {
        Session::in_memory()
    } else {
        Session::restore(
            Arc::new(FileStorage::new(data_dir.join("session"))),
            Arc::new(SystemClock),
            settings.auth.storage_key.clone(),
        )
    };

    RailClientBuilder::from_settings(settings)
        .session(Arc::new(session))
        .cookie_jar(jar)
        .build()
        .context("Failed to build API client")
}

/// Validate the stored session before the first API call
async fn ready(client: &RailClient) {
    client.manager().initialize().await;
}

fn print_session(client: &RailClient) {
    let session = client.session();
    match session.credentials() {
        Some(credentials) => {
            let expires = DateTime::<Utc>::from_timestamp_millis(credentials.expires_at_ms())
                .map_or_else(|| credentials.expires_at_ms().to_string(), |at| at.to_rfc3339());
            let state = if session.is_authenticated() {
                "authenticated"
            } else {
                "expired"
            };
            println!("{state} (token expires {expires})");
        }
        None => println!("not logged in"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
