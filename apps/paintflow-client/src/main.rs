mod app;
mod config;
mod logging;
mod signals;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pf_utils::SecretString;
use preferences_sdk::Theme;
use serde::Deserialize;
use session::SessionRepository;
use session_sdk::{SessionCredentials, UserProfile};

use crate::app::ClientCore;
use crate::config::AppConfig;

/// PaintFlow client core: theme and preference sync, session validation
#[derive(Parser)]
#[command(name = "paintflow-client")]
#[command(about = "PaintFlow client core: theme and preference sync, session validation")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync preferences and validate the session until interrupted
    Run,
    /// Validate configuration and exit
    Check,
    /// Switch theme instantly and push it to the server
    Theme {
        /// light, dark or system
        value: Theme,
    },
    /// Show and manage preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Show the stored session and check that it is still usable
    Session,
    /// Store a session
    Login {
        /// Bearer token issued by the backend
        #[arg(long)]
        token: String,
        /// User profile as JSON, e.g. '{"id":1,"email":"a@b.c"}'
        #[arg(long)]
        user: String,
    },
    /// Drop the stored session
    Logout,
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Fetch and print the merged preferences
    Show,
    /// Update one preference; VALUE is JSON (strings may be bare)
    Set { key: String, value: String },
    /// Restore the server-side defaults, keeping this device's theme
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // defaults -> YAML (if provided) -> env (PAINTFLOW__*) -> CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.verbose);
    logging::init(&config.logging);

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    config.validate()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config).await,
        Commands::Check => check(&config),
        Commands::Theme { value } => theme(&config, value).await,
        Commands::Prefs { action } => prefs(&config, action).await,
        Commands::Session => session_status(&config).await,
        Commands::Login { token, user } => login(&config, token, &user),
        Commands::Logout => logout(&config),
    }
}

async fn run(config: &AppConfig) -> Result<()> {
    let core = ClientCore::build(config)?;
    tracing::info!(base_url = %config.api.base_url, "PaintFlow client starting");

    if core.preferences.refresh().await.is_ok() {
        tracing::info!(appearance = %core.preferences.appearance(), "preferences synced");
    }
    core.validator.start();

    let mut status = core.session.watch();
    tokio::select! {
        result = signals::wait_for_shutdown() => result?,
        () = signed_out(&mut status) => {
            tracing::warn!("session ended; sign in again to continue syncing");
            signals::wait_for_shutdown().await?;
        }
    }

    core.validator.shutdown().await;
    core.preferences.flush().await;
    tracing::info!("PaintFlow client stopped");
    Ok(())
}

/// Resolves on the next transition to signed-out, never on the initial value.
async fn signed_out(status: &mut tokio::sync::watch::Receiver<session::SessionStatus>) {
    while status.changed().await.is_ok() {
        if *status.borrow_and_update() == session::SessionStatus::SignedOut {
            return;
        }
    }
    std::future::pending::<()>().await;
}

fn check(config: &AppConfig) -> Result<()> {
    tracing::info!("checking configuration");
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn theme(config: &AppConfig, value: Theme) -> Result<()> {
    let core = ClientCore::build(config)?;
    core.preferences.update_theme_instantly(value);
    core.preferences.flush().await;
    println!("{}", core.preferences.appearance());
    Ok(())
}

async fn prefs(config: &AppConfig, action: PrefsAction) -> Result<()> {
    let core = ClientCore::build(config)?;
    let current = match action {
        PrefsAction::Show => {
            if let Err(e) = core.preferences.refresh().await {
                eprintln!("server unavailable, showing local values: {e}");
            }
            core.preferences.get_preferences()
        }
        PrefsAction::Set { key, value } => {
            let value = serde_json::from_str(&value)
                .unwrap_or(serde_json::Value::String(value));
            core.preferences
                .update_preference_value(&key, value)
                .await
                .with_context(|| format!("failed to update '{key}'"))?
        }
        PrefsAction::Reset => core
            .preferences
            .reset_preferences()
            .await
            .context("failed to reset preferences")?,
    };
    core.preferences.flush().await;

    println!("{current:#?}");
    let classes = core.root.class_list();
    if !classes.is_empty() {
        println!("root classes: {classes}");
    }
    Ok(())
}

async fn session_status(config: &AppConfig) -> Result<()> {
    let core = ClientCore::build(config)?;
    let Some(credentials) = core.session.current() else {
        println!("signed out");
        return Ok(());
    };

    println!("signed in as {}", credentials.user.email);
    let outcome = core.validator.tick().await;
    println!("validation: {outcome:?}");
    println!("usable: {}", outcome.is_usable());
    Ok(())
}

/// `--user` payload. Ids may be numbers or strings.
#[derive(Deserialize)]
struct UserArg {
    id: serde_json::Value,
    email: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl From<UserArg> for UserProfile {
    fn from(arg: UserArg) -> Self {
        let id = match arg.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Self {
            id,
            email: arg.email,
            full_name: arg.full_name,
            role: arg.role,
        }
    }
}

fn login(config: &AppConfig, token: String, user: &str) -> Result<()> {
    let user: UserArg = serde_json::from_str(user).context("--user is not a valid profile")?;
    let core = ClientCore::build(config)?;
    core.session
        .login(SessionCredentials::new(SecretString::new(token), user.into()))
        .context("failed to store session")?;
    println!("signed in");
    Ok(())
}

fn logout(config: &AppConfig) -> Result<()> {
    let core = ClientCore::build(config)?;
    core.session.logout().context("failed to clear session")?;
    println!("signed out");
    Ok(())
}
