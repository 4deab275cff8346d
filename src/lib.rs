//! Stranger Beers ingestion library
//!
//! Receives Tally form webhooks, links payments to registrations and keeps
//! submission logs. Exposed as a library for the binary and the tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod phone;
pub mod repositories;
pub mod services;
pub mod store;
pub mod tally;
pub mod telemetry;

// Re-export commonly used types
pub use api::{create_router, AppState, SharedState};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use store::{IngestionStore, MemoryStore, PgStore};
