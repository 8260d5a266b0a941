//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, revocation store selection, metrics
//! recorder, limiter sweeper and the Axum server lifecycle.

use crate::api::middleware::admission::Admission;
use crate::api::middleware::client_ip::ClientIdentityResolver;
use crate::api::middleware::metrics;
use crate::application::services::{CarService, SessionService, TokenAuthenticator};
use crate::config::{Config, ServiceKind};
use crate::domain::identity::IdentityAuthority;
use crate::domain::limiter_sweeper::run_limiter_sweeper;
use crate::domain::rate_limiter::SlidingWindowLimiter;
use crate::infrastructure::auth::{JwtService, PasswordHasher};
use crate::infrastructure::identity::{HttpIdentityAuthority, LocalIdentityAuthority};
use crate::infrastructure::persistence::{PgCarRepository, PgUserRepository};
use crate::infrastructure::revocation::{
    MemoryRevocationStore, RedisRevocationStore, RevocationStore,
};
use crate::routes::{car_app, user_app};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

/// Upper bound on a single revocation store round trip.
const REVOCATION_OP_TIMEOUT: Duration = Duration::from_secs(1);

/// Refresh period of the host CPU and memory gauges.
const SYSTEM_SAMPLE_INTERVAL: Duration = Duration::from_secs(15);

/// Runs the `kind` service with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and the service's migrations
/// - Redis revocation store (or the in-process store when Redis is not configured)
/// - Prometheus recorder and the host usage sampler
/// - Rate limiter and its sweeper task
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Redis is configured but unreachable
/// - The identity authority client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config, kind: ServiceKind) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    migrate(&pool, kind).await?;

    let revocations = revocation_store(config.redis_url.as_deref()).await?;
    let metrics_handle = metrics::install_recorder()?;
    tokio::spawn(metrics::run_system_sampler(SYSTEM_SAMPLE_INTERVAL));

    let limiter = Arc::new(SlidingWindowLimiter::new(
        config.rate_limit_times,
        config.rate_limit_seconds,
    ));
    tokio::spawn(run_limiter_sweeper(
        limiter.clone(),
        Duration::from_secs(config.rate_limit_sweep_seconds),
    ));
    tracing::info!("Rate limiter sweeper started");

    let resolver = ClientIdentityResolver::new(config.behind_proxy);
    let pool = Arc::new(pool);

    let app = match kind {
        ServiceKind::Users => {
            let users = Arc::new(PgUserRepository::new(pool));
            let secret = config
                .jwt_secret
                .as_deref()
                .context("JWT_SECRET must be set for the users service")?;
            let jwt = Arc::new(JwtService::new(secret, config.token_ttl()));

            let authority: Arc<dyn IdentityAuthority> =
                Arc::new(LocalIdentityAuthority::new(jwt.clone(), users.clone()));
            let authenticator = Arc::new(TokenAuthenticator::new(revocations.clone(), authority));
            let admission = Admission::new(limiter, resolver, authenticator);

            let service = Arc::new(SessionService::new(
                users,
                PasswordHasher::new(),
                jwt,
                revocations.clone(),
            ));

            user_app(AppState::new(service, revocations), &admission, metrics_handle)
        }
        ServiceKind::Cars => {
            let base_url = config
                .identity_authority_url
                .as_deref()
                .context("IDENTITY_AUTHORITY_URL must be set for the cars service")?;
            let authority: Arc<dyn IdentityAuthority> = Arc::new(
                HttpIdentityAuthority::new(base_url, config.identity_timeout())
                    .context("Failed to build identity authority client")?,
            );
            let authenticator = Arc::new(TokenAuthenticator::new(revocations.clone(), authority));
            let admission = Admission::new(limiter, resolver, authenticator);

            let service = Arc::new(CarService::new(Arc::new(PgCarRepository::new(pool))));

            car_app(AppState::new(service, revocations), &admission, metrics_handle)
        }
    };

    let app = NormalizePathLayer::trim_trailing_slash().layer(app);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("{kind} service listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn migrate(pool: &PgPool, kind: ServiceKind) -> Result<()> {
    match kind {
        ServiceKind::Users => sqlx::migrate!("./migrations/users").run(pool).await,
        ServiceKind::Cars => sqlx::migrate!("./migrations/cars").run(pool).await,
    }
    .context("Failed to run migrations")?;

    tracing::info!("Migrations applied");
    Ok(())
}

/// Picks the revocation store.
///
/// With `redis_url` set, Redis must be reachable: a process that silently
/// kept revocations to itself would let tokens logged out on another
/// instance through. Without it, the in-process store is used.
///
/// # Errors
///
/// Returns an error if `redis_url` is set and Redis cannot be reached.
pub async fn revocation_store(redis_url: Option<&str>) -> Result<Arc<dyn RevocationStore>> {
    let Some(redis_url) = redis_url else {
        tracing::warn!("REDIS_URL not set. Revocations are local to this process.");
        return Ok(Arc::new(MemoryRevocationStore::new()));
    };

    let redis = RedisRevocationStore::connect(redis_url, REVOCATION_OP_TIMEOUT)
        .await
        .context("Failed to connect to the configured revocation store")?;

    tracing::info!("Revocation store: Redis");
    Ok(Arc::new(redis))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
