//! Stranger Beers service binary
//!
//! `serve` (the default) runs the Tally ingestion API. The remaining
//! subcommands are database tasks and the planned matching and comms
//! services.

use anyhow::{anyhow, Context};
use clap::Parser;
use std::sync::Arc;
use stranger_beers_ingestion::cli::{placeholder_message, Cli, Commands, DbCommand, ServeArgs};
use stranger_beers_ingestion::database::{create_pool, run_migrations};
use stranger_beers_ingestion::telemetry::init_tracing;
use stranger_beers_ingestion::{create_router, AppConfig, AppState, IngestionStore, MemoryStore, PgStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Placeholders run without configuration or a database
    if let Some(message) = cli.command.as_ref().and_then(placeholder_message) {
        println!("{}", message);
        return Ok(());
    }

    let config = AppConfig::from_env()
        .map_err(|e| anyhow!(e))
        .context("Configuration error")?;
    init_tracing(&config.logging, config.database.log_statements);

    match (cli.serve_args(), cli.command) {
        (Some(args), _) => serve(config, args).await,
        (
            None,
            Some(Commands::Db {
                command: DbCommand::Upgrade,
            }),
        ) => db_upgrade(&config).await,
        _ => Ok(()),
    }
}

async fn db_upgrade(config: &AppConfig) -> anyhow::Result<()> {
    info!("Connecting to database...");
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;

    info!("Running database migrations...");
    run_migrations(&pool).await.context("Database migration failed")?;
    info!("Database migrations completed successfully");

    pool.close().await;
    Ok(())
}

async fn serve(config: AppConfig, args: ServeArgs) -> anyhow::Result<()> {
    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Stranger Beers Ingestion API Starting             ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!(service = "ingestion-api", version = env!("CARGO_PKG_VERSION"), "Starting");
    info!("Log level: {}", config.logging.level);
    info!("Signup form: {}", display_or_unset(&config.tally.signup_form_id));
    info!("Payment form: {}", display_or_unset(&config.tally.payment_form_id));
    if !config.tally.verify_signature {
        warn!("Tally signature verification is disabled");
    }

    // =========================================================================
    // STORAGE SETUP
    // =========================================================================
    let store: Arc<dyn IngestionStore> = if args.memory_store {
        warn!("Using in-memory store, data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        info!("Connecting to database...");
        let pool = create_pool(&config.database)
            .await
            .context("Failed to create database pool")?;
        info!("Max connections: {}", config.database.max_connections);

        info!("Running database migrations...");
        run_migrations(&pool).await.context("Database migration failed")?;
        info!("✓ Database ready");

        Arc::new(PgStore::new(pool))
    };

    // =========================================================================
    // START SERVER
    // =========================================================================
    let addr = config.bind_address();
    let state = Arc::new(AppState::new(config, store));
    let app = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Stranger Beers Ingestion API Ready!               ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  HTTP:      {}", addr);
    info!("║  Docs:      http://{}/docs", addr);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Ingestion API shutdown complete");
    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, shutting down gracefully...");
}
