//! User store bootstrap
//!
//! Loads configuration, connects to the database and applies migrations.
//!
//! ```sh
//! # Default config (~/.config/user-store/config.toml)
//! user-store
//!
//! # Validate config without touching the database
//! user-store --config /etc/user-store/config.toml --check
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use user_store::domain::ListUsersQuery;
use user_store::infrastructure::database::migrator::Migrator;
use user_store::{default_config_path, init_database, AppConfig, SeaOrmUserRepository, UserService};

#[derive(Parser, Debug)]
#[command(name = "user-store", version, about = "Prepare the user store database")]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let (app_cfg, load_err) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    let level = cli.log_level.as_deref().unwrap_or(&app_cfg.logging.level);
    init_tracing(level);

    match load_err {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) if cli.check => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
        Some(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    if cli.check {
        info!("Configuration OK");
        return Ok(());
    }

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&app_cfg.database_config()).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    let users = UserService::new(Arc::new(SeaOrmUserRepository::new(db)))
        .with_email_reuse(app_cfg.users.email_reuse);
    let active = users.list_users(ListUsersQuery::default()).await?;
    info!(
        active_users = active.total,
        email_reuse = ?users.email_reuse(),
        "User store ready"
    );

    Ok(())
}
