//! BucketDrive server: shared links for object-storage buckets.
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use bucketdrive_api::AppState;
use bucketdrive_auth::{Authenticator, JwtDecoder, JwtEncoder};
use bucketdrive_core::clock::{Clock, SystemClock};
use bucketdrive_core::config::AppConfig;
use bucketdrive_core::error::AppError;
use bucketdrive_database::repositories::{AuditRepository, DirectoryRepository, LinkRepository};
use bucketdrive_database::{AuditStore, DatabasePool, DirectoryStore, LinkStore};
use bucketdrive_service::{ShareLinkService, SharedDownloadService, TokenGenerator};
use bucketdrive_worker::{CronScheduler, LinkSweepJobHandler};

#[derive(Debug, Parser)]
#[command(name = "bucketdrive-server", version, about = "BucketDrive shared link server")]
struct Cli {
    /// Configuration directory
    #[arg(long, env = "BUCKETDRIVE_CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment overlay (`{config_dir}/{env}.toml`)
    #[arg(long, env = "BUCKETDRIVE_ENV", default_value = "development")]
    env: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Revoke every expired shared link once and exit
    SweepLinks,
    /// Print a bearer token for an existing user
    IssueToken {
        /// User to issue the token for
        #[arg(long)]
        user_id: Uuid,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::SweepLinks => sweep_links(config).await,
        Command::IssueToken { user_id } => issue_token(config, user_id).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Fatal error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// PostgreSQL-backed stores.
struct Stores {
    pool: DatabasePool,
    links: Arc<dyn LinkStore>,
    audit: Arc<dyn AuditStore>,
    directory: Arc<dyn DirectoryStore>,
}

async fn open_stores(config: &AppConfig) -> Result<Stores, AppError> {
    let db = DatabasePool::connect(&config.database).await?;

    bucketdrive_database::migration::run_migrations(db.pool()).await?;

    let pool = db.pool().clone();
    Ok(Stores {
        links: Arc::new(LinkRepository::new(pool.clone())),
        audit: Arc::new(AuditRepository::new(pool.clone())),
        directory: Arc::new(DirectoryRepository::new(pool)),
        pool: db,
    })
}

fn share_service(stores: &Stores) -> Arc<ShareLinkService> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    Arc::new(ShareLinkService::new(
        Arc::clone(&stores.links),
        Arc::clone(&stores.audit),
        Arc::clone(&stores.directory),
        Arc::new(TokenGenerator::new()),
        clock,
    ))
}

/// Main server run function
async fn serve(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting BucketDrive v{}", env!("CARGO_PKG_VERSION"));

    let stores = open_stores(&config).await?;

    tracing::info!(provider = %config.storage.provider, "Initializing object storage...");
    let objects = bucketdrive_storage::build_object_store(&config.storage).await?;

    let shares = share_service(&stores);
    let downloads = Arc::new(SharedDownloadService::new(Arc::clone(&shares), objects));
    let authenticator = Arc::new(Authenticator::new(
        JwtDecoder::new(&config.auth),
        Arc::clone(&stores.directory),
    ));

    let mut scheduler = if config.worker.enabled {
        let scheduler = CronScheduler::new().await?;
        scheduler
            .register(
                &config.worker.link_sweep_cron,
                Arc::new(LinkSweepJobHandler::new(Arc::clone(&shares))),
            )
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    let config = Arc::new(config);
    let state = AppState {
        config: Arc::clone(&config),
        db_pool: Some(stores.pool.clone()),
        authenticator,
        share_service: shares,
        download_service: downloads,
    };
    let app = bucketdrive_api::build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("BucketDrive server listening on {}", addr);

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    serve_with_grace(listener, app, shutdown_signal(), grace).await?;

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler did not shut down cleanly");
        }
    }
    stores.pool.close().await;

    tracing::info!("BucketDrive server stopped");
    Ok(())
}

/// Serve `app` until `shutdown` resolves, then give open connections at
/// most `grace` to finish before dropping them.
async fn serve_with_grace<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => return server_result(joined),
        () = shutdown => {}
    }

    tracing::info!(
        grace_seconds = grace.as_secs(),
        "Shutdown signal received, starting graceful shutdown..."
    );
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => server_result(joined),
        Err(_) => {
            server.abort();
            tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            );
            Ok(())
        }
    }
}

fn server_result(joined: Result<std::io::Result<()>, JoinError>) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::internal(format!("Server error: {e}"))),
        Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
    }
}

/// One-shot expiry sweep for external schedulers
async fn sweep_links(config: AppConfig) -> Result<(), AppError> {
    let stores = open_stores(&config).await?;
    let shares = share_service(&stores);

    let count = shares.sweep_expired(shares.now()).await?;
    println!("{count}");

    stores.pool.close().await;
    Ok(())
}

/// Issue a bearer token for an existing, active user
async fn issue_token(config: AppConfig, user_id: Uuid) -> Result<(), AppError> {
    let stores = open_stores(&config).await?;

    let user = stores
        .directory
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
    if !user.is_active {
        return Err(AppError::validation(format!("User {user_id} is disabled")));
    }

    let (token, expires_at) =
        JwtEncoder::new(&config.auth).generate_access_token(&user, SystemClock.now())?;
    tracing::info!(user_id = %user_id, %expires_at, "Issued access token");
    println!("{token}");

    stores.pool.close().await;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
