//! OpenAPI document generated from handler annotations via utoipa.

use axum::Json;
use utoipa::OpenApi;

use super::handlers::health::{HealthResponse, ServiceInfo};
use super::handlers::tally::WebhookResponse;
use crate::error::ErrorResponse;
use crate::models::PaymentLinkStatus;
use crate::tally::FormType;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stranger Beers Ingestion API",
        description = "Webhook receiver for Stranger Beers Tally forms"
    ),
    paths(
        super::handlers::health::root,
        super::handlers::health::health_check,
        super::handlers::health::readiness_check,
        super::handlers::tally::receive_tally_webhook,
    ),
    components(schemas(
        ErrorResponse,
        FormType,
        HealthResponse,
        PaymentLinkStatus,
        ServiceInfo,
        WebhookResponse
    )),
    tags(
        (name = "health", description = "Health and readiness checks"),
        (name = "webhooks", description = "Tally form submissions"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_webhook_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/webhooks/tally"));
        assert!(doc.paths.paths.contains_key("/health"));
        assert_eq!(doc.info.title, "Stranger Beers Ingestion API");
    }
}
