//! HTTP API: Tally webhook receiver plus health and docs endpoints.

pub mod handlers;
pub mod openapi;
pub mod routes;

use crate::config::AppConfig;
use crate::services::{PaymentService, SignupService};
use crate::store::IngestionStore;
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn IngestionStore>,
    pub signup_service: SignupService,
    pub payment_service: PaymentService,
}

impl AppState {
    /// Wire the services to a storage backend
    pub fn new(config: AppConfig, store: Arc<dyn IngestionStore>) -> Self {
        let payment_submission_means_paid = config.tally.payment_submission_means_paid;
        Self {
            config: Arc::new(config),
            signup_service: SignupService::new(store.clone()),
            payment_service: PaymentService::new(store.clone(), payment_submission_means_paid),
            store,
        }
    }
}

pub type SharedState = Arc<AppState>;

pub use routes::create_router;
