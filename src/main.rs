//! `motorpool` entry point.
//!
//! # Usage
//!
//! ```bash
//! # User/auth service (identity authority)
//! motorpool users
//!
//! # Car inventory service
//! motorpool cars
//!
//! # Create an admin account in the users database
//! motorpool create-admin --username root --password 's3cret!'
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use motorpool::application::services::SessionService;
use motorpool::config::{self, Config, ServiceKind};
use motorpool::infrastructure::auth::{JwtService, PasswordHasher};
use motorpool::infrastructure::persistence::PgUserRepository;
use motorpool::infrastructure::revocation::MemoryRevocationStore;
use motorpool::server;

#[derive(Parser)]
#[command(name = "motorpool")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the user/auth service
    Users,

    /// Run the car inventory service
    Cars,

    /// Create an admin account in the users database
    CreateAdmin {
        #[arg(long)]
        username: String,

        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Users => serve(ServiceKind::Users).await,
        Commands::Cars => serve(ServiceKind::Cars).await,
        Commands::CreateAdmin { username, password } => {
            let config = Config::from_env()?;
            init_tracing(&config.log_level, &config.log_format);
            create_admin(&config, &username, password).await
        }
    }
}

async fn serve(kind: ServiceKind) -> Result<()> {
    let config = config::load_from_env(kind)?;
    init_tracing(&config.log_level, &config.log_format);
    config.print_summary(kind);

    server::run(config, kind).await
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    if format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn create_admin(config: &Config, username: &str, password: String) -> Result<()> {
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    sqlx::migrate!("./migrations/users")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    // Only account creation is used; the token settings are irrelevant here.
    let sessions = SessionService::new(
        Arc::new(PgUserRepository::new(Arc::new(pool))),
        PasswordHasher::new(),
        Arc::new(JwtService::new(
            config.jwt_secret.as_deref().unwrap_or_default(),
            config.token_ttl(),
        )),
        Arc::new(MemoryRevocationStore::new()),
    );

    let user = sessions
        .create_admin(username, password)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing::info!(id = user.id, user = %user.username, "Admin account created");
    Ok(())
}
