//! Tally webhook receiver.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::SharedState;
use crate::error::{AppError, AppResult};
use crate::models::PaymentLinkStatus;
use crate::tally::{
    compute_body_hash, determine_form_type, form_id_of, parse_submission, verify_tally_signature,
    FormType, ParsedSubmission, TallyData, SIGNATURE_HEADER,
};

/// Body returned once a submission has been accepted
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WebhookResponse {
    pub status: String,
    pub form_type: FormType,
    pub registration_id: Option<String>,
    pub link_status: Option<PaymentLinkStatus>,
    pub is_emergency: bool,
    pub message: Option<String>,
}

/// Receive a Tally form submission.
///
/// Routes by `data.formId` to signup or payment processing. Emergency
/// payments (orphan or ambiguous) are still accepted with 201 and flagged
/// in the response.
#[utoipa::path(
    post,
    path = "/webhooks/tally",
    tag = "webhooks",
    request_body(content = String, description = "Raw Tally webhook JSON", content_type = "application/json"),
    params(
        ("tally-signature" = Option<String>, Header, description = "HMAC-SHA256 of the body, hex or base64"),
    ),
    responses(
        (status = 201, description = "Submission received", body = WebhookResponse),
        (status = 400, description = "Malformed or unroutable payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Signature rejected", body = crate::error::ErrorResponse),
    )
)]
pub async fn receive_tally_webhook(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<WebhookResponse>)> {
    let body_hash = compute_body_hash(&body);
    let tally = &state.config.tally;

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(body_hash = %body_hash, error = %e, "Rejecting webhook with invalid JSON");
        AppError::InvalidJson(e)
    })?;

    let form_id = form_id_of(&payload)
        .ok_or_else(|| AppError::Validation("Missing formId in payload".to_string()))?;

    let form_type = determine_form_type(&form_id, tally)
        .ok_or_else(|| AppError::Validation(format!("Unknown form_id: {}", form_id)))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    verify_tally_signature(&body, signature, form_type, tally)?;

    let data = TallyData::from_payload(&payload);
    info!(
        form_id = %form_id,
        form_type = %form_type,
        submission_id = ?data.submission_id(),
        body_hash = %body_hash,
        "Received Tally webhook"
    );

    let response = match parse_submission(&data, payload, form_type, &tally.default_phone_region) {
        ParsedSubmission::Signup(parsed) => {
            let outcome = state.signup_service.process(&parsed, &body_hash).await?;
            WebhookResponse {
                status: "received".to_string(),
                form_type,
                registration_id: Some(outcome.registration_id.clone()),
                link_status: None,
                is_emergency: false,
                message: Some(outcome.message().to_string()),
            }
        }
        ParsedSubmission::Payment(parsed) => {
            let outcome = state.payment_service.process(&parsed, &body_hash).await?;
            WebhookResponse {
                status: "received".to_string(),
                form_type,
                registration_id: outcome.registration_id,
                link_status: outcome.link_status,
                is_emergency: outcome.is_emergency,
                message: Some(outcome.message),
            }
        }
    };

    Ok((StatusCode::CREATED, Json(response)))
}
