//! Snowflake Writer Migration Tool
//!
//! Copies Snowflake writer configurations from a source project into the
//! current (destination) project, re-provisioning Keboola-managed credentials

// snowflake-writer-migrate/src/main.rs
mod config;
mod errors;
mod logging;
mod migrate;
mod storage;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use config::{AppConfig, resolve_config_path};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "snowflake-writer-migrate", version, about = "Migrate Snowflake writers between projects")]
struct Cli {
    /// Path to config.json (defaults to $KBC_DATADIR/config.json, then ./config.json)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Log every write instead of performing it
    #[arg(long)]
    dry_run: bool,
}

/// Main entry point for the migration tool
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    logging::init();

    match run_app(Cli::parse()).await {
        Ok(_) => {
            info!("✅ Migration completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<errors::AppError>() {
                Some(app_err) if app_err.is_user_error() => error!("❌ {}", app_err),
                _ => error!("❌ Error: {:?}", e),
            }
            ExitCode::from(errors::exit_code_for(&e))
        }
    }
}

async fn run_app(cli: Cli) -> Result<()> {
    let config_path = resolve_config_path(cli.config);
    let mut app_config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load application configuration from {}", config_path.display()))?;
    if cli.dry_run {
        app_config.migrate.options.dry_run = true;
    }

    info!(
        "🚀 Starting migration (run id {}){}",
        app_config.destination.run_id,
        if app_config.migrate.options.dry_run { " in dry-run mode" } else { "" }
    );

    let summary = migrate::run_migrate_flow(&app_config).await?;

    info!(
        "{}Migrated {} configuration(s), {} with new workspace credentials, {} row(s)",
        if summary.dry_run { "[dry-run] " } else { "" },
        summary.configurations,
        summary.rehydrated,
        summary.rows
    );
    if summary.not_entitled > 0 {
        warn!(
            "{} managed writer(s) kept their original credentials; the destination project cannot create Snowflake workspaces",
            summary.not_entitled
        );
    }
    Ok(())
}
