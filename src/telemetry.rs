//! Tracing subscriber setup.

use crate::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
///
/// `verbose_sql` raises sqlx to debug so individual statements are logged.
pub fn default_filter(level: &str, verbose_sql: bool) -> String {
    let sqlx_level = if verbose_sql { "debug" } else { "warn" };
    format!(
        "stranger_beers_ingestion={level},stranger_beers={level},tower_http={level},sqlx={sqlx_level}"
    )
}

/// Install the global tracing subscriber, plain or JSON
pub fn init_tracing(logging: &LoggingConfig, verbose_sql: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&logging.level, verbose_sql)));

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}
