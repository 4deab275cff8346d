mod helpers;

use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use helpers::*;
use serde_json::json;
use stranger_beers_ingestion::models::PaymentLinkStatus;
use stranger_beers_ingestion::tally::compute_signature;

// ============================================================================
// Health and docs
// ============================================================================

#[tokio::test]
async fn test_health_returns_fixed_body() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "service": "ingestion-api"}));
}

#[tokio::test]
async fn test_root_returns_service_info() {
    let app = TestApp::new();
    let (status, body) = app.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "Stranger Beers Ingestion API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["docs"], "/docs");
}

#[tokio::test]
async fn test_ready_with_memory_store() {
    let app = TestApp::new();
    let (status, _) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ready_when_store_unreachable() {
    let app = TestApp::unavailable();

    let (status, _) = app.get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_store_failure_hides_database_details() {
    let app = TestApp::unavailable();
    let payload = signup_payload(Some("REG-1"), "EVT-1", "0612345678", "ada@example.com");

    let (status, body) = app.post_json(&payload).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"code": "DATABASE_ERROR", "message": "Database operation failed"}));
}

#[tokio::test]
async fn test_docs_serves_openapi_document() {
    let app = TestApp::new();
    let (status, body) = app.get("/docs").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["openapi"].as_str().unwrap().starts_with('3'));
    assert!(body["paths"]["/webhooks/tally"]["post"].is_object());
    assert!(body["paths"]["/health"]["get"].is_object());
}

// ============================================================================
// Request validation
// ============================================================================

#[tokio::test]
async fn test_invalid_json_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.post_webhook(b"not json{", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
    assert_eq!(body["message"], "Invalid JSON payload");
}

#[tokio::test]
async fn test_missing_form_id_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.post_json(&json!({"data": {"fields": []}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing formId in payload");

    let (status, body) = app.post_json(&json!({"data": {"formId": ""}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing formId in payload");
}

#[tokio::test]
async fn test_unknown_form_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.post_json(&json!({"data": {"formId": "someOtherForm"}})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "Unknown form_id: someOtherForm");
}

#[tokio::test]
async fn test_badly_typed_form_id_and_data() {
    let app = TestApp::new();

    let (status, body) = app.post_json(&json!({"data": {"formId": 12345}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown form_id: 12345");

    let (status, body) = app.post_json(&json!({"data": [SIGNUP_FORM_ID]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing formId in payload");
}

#[tokio::test]
async fn test_badly_typed_fields_are_skipped() {
    let app = TestApp::new();
    let payload = json!({
        "data": {
            "formId": SIGNUP_FORM_ID,
            "fields": [
                {"key": 7, "label": "Whats your phone number?", "value": "0612345678"},
                "not a field",
                {"key": "event_id", "label": "event_id", "value": "EVT-1"}
            ]
        }
    });

    let (status, body) = app.post_json(&payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "created");

    let registrations = app.store.registrations().await;
    assert_eq!(registrations[0].event_id, "EVT-1");
    assert_eq!(registrations[0].phone_e164.as_deref(), Some("+31612345678"));
}

// ============================================================================
// Signature verification
// ============================================================================

#[tokio::test]
async fn test_signature_required_when_enabled() {
    let app = TestApp::with_tally(tally_config(true));
    let body = signup_payload(Some("REG-1"), "EVT-1", "0612345678", "ada@example.com").to_string();

    let (status, response) = app.post_webhook(body.as_bytes(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["message"], "Missing tally-signature header");

    let (status, response) = app.post_webhook(body.as_bytes(), Some("deadbeef")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["message"], "Invalid signature");

    assert!(app.store.registrations().await.is_empty());
}

#[tokio::test]
async fn test_signature_checked_before_fields_are_read() {
    let app = TestApp::with_tally(tally_config(true));
    let body = json!({"data": {"formId": SIGNUP_FORM_ID, "fields": "nope"}}).to_string();

    let (status, response) = app.post_webhook(body.as_bytes(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["message"], "Missing tally-signature header");
}

#[tokio::test]
async fn test_signature_from_wrong_form_secret_is_rejected() {
    let app = TestApp::with_tally(tally_config(true));
    let body = signup_payload(Some("REG-1"), "EVT-1", "0612345678", "ada@example.com").to_string();
    let signature = compute_signature(body.as_bytes(), PAYMENT_SECRET);

    let (status, _) = app.post_webhook(body.as_bytes(), Some(&signature)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_hex_and_base64_signatures_are_accepted() {
    let app = TestApp::with_tally(tally_config(true));

    let body = signup_payload(Some("REG-1"), "EVT-1", "0612345678", "ada@example.com").to_string();
    let hex_signature = compute_signature(body.as_bytes(), SIGNUP_SECRET);
    let (status, _) = app.post_webhook(body.as_bytes(), Some(&hex_signature)).await;
    assert_eq!(status, StatusCode::CREATED);

    let body = payment_payload(Some("REG-1"), None, None).to_string();
    let raw = hex::decode(compute_signature(body.as_bytes(), PAYMENT_SECRET)).unwrap();
    let (status, response) = app.post_webhook(body.as_bytes(), Some(&STANDARD.encode(raw))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["link_status"], "matched_by_registration_id");
}

// ============================================================================
// Signups
// ============================================================================

#[tokio::test]
async fn test_signup_created_then_updated() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(&signup_payload(Some("REG-1"), "EVT-1", "06 12345678", "old@example.com"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "received");
    assert_eq!(body["form_type"], "signup");
    assert_eq!(body["registration_id"], "REG-1");
    assert_eq!(body["message"], "created");
    assert_eq!(body["is_emergency"], false);

    let (status, body) = app
        .post_json(&signup_payload(Some("REG-1"), "EVT-1", "06 12345678", "new@example.com"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "updated");

    let registrations = app.store.registrations().await;
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].email.as_deref(), Some("new@example.com"));
    assert_eq!(registrations[0].phone_e164.as_deref(), Some("+31612345678"));
    assert!(!registrations[0].paid);

    let signups = app.store.signups().await;
    assert_eq!(signups.len(), 2);
    assert_eq!(signups[0].answers.first_name.as_deref(), Some("Ada"));
    assert_eq!(signups[0].answers.phone.as_deref(), Some("+31612345678"));
    assert_eq!(signups[0].answers.creative_expression_score, Some(4));
}

#[tokio::test]
async fn test_signup_retry_after_payment_keeps_payment() {
    let app = TestApp::new();
    let signup = signup_payload(Some("REG-1"), "EVT-1", "0612345678", "ada@example.com");

    app.post_json(&signup).await;
    let (_, body) = app.post_json(&payment_payload(Some("REG-1"), None, None)).await;
    assert_eq!(body["message"], "paid");

    let (status, body) = app.post_json(&signup).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "updated");

    let registration = &app.store.registrations().await[0];
    assert!(registration.paid);
    assert!(registration.payment_payload.is_some());
    assert_eq!(registration.link_status(), PaymentLinkStatus::MatchedByRegistrationId);
}

#[tokio::test]
async fn test_signup_without_registration_id_gets_generated_one() {
    let app = TestApp::new();
    let (status, body) = app
        .post_json(&signup_payload(None, "EVT-1", "0612345678", "ada@example.com"))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let registration_id = body["registration_id"].as_str().unwrap();
    assert!(registration_id.starts_with("REG-"));
    assert_eq!(registration_id.len(), 16);
}

// ============================================================================
// Payments
// ============================================================================

#[tokio::test]
async fn test_payment_matched_by_registration_id() {
    let app = TestApp::new();
    app.post_json(&signup_payload(Some("REG-1"), "EVT-1", "0612345678", "ada@example.com"))
        .await;

    let (status, body) = app.post_json(&payment_payload(Some("REG-1"), None, None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["form_type"], "payment");
    assert_eq!(body["registration_id"], "REG-1");
    assert_eq!(body["link_status"], "matched_by_registration_id");
    assert_eq!(body["is_emergency"], false);
    assert_eq!(body["message"], "paid");

    let registration = &app.store.registrations().await[0];
    assert!(registration.paid);
    assert!(registration.paid_at.is_some());
    assert_eq!(registration.link_status(), PaymentLinkStatus::MatchedByRegistrationId);

    let payments = app.store.payments().await;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status.as_deref(), Some("Yes, I paid"));
}

#[tokio::test]
async fn test_payment_matched_by_phone() {
    let app = TestApp::new();
    app.post_json(&signup_payload(Some("REG-1"), "EVT-1", "06 12345678", "ada@example.com"))
        .await;

    let (status, body) = app
        .post_json(&payment_payload(None, Some("EVT-1"), Some("+31 6 12345678")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["registration_id"], "REG-1");
    assert_eq!(body["link_status"], "matched_by_phone");

    let registration = &app.store.registrations().await[0];
    assert!(registration.paid);
    assert_eq!(registration.payment_claimed_phone_e164.as_deref(), Some("+31612345678"));

    let payments = app.store.payments().await;
    assert_eq!(payments[0].phone.as_deref(), Some("+31612345678"));
    assert_eq!(payments[0].recognized, Some(true));
}

#[tokio::test]
async fn test_ambiguous_phone_is_flagged() {
    let app = TestApp::new();
    app.post_json(&signup_payload(Some("REG-1"), "EVT-1", "0612345678", "a@example.com"))
        .await;
    app.post_json(&signup_payload(Some("REG-2"), "EVT-1", "0612345678", "b@example.com"))
        .await;

    let (status, body) = app
        .post_json(&payment_payload(None, Some("EVT-1"), Some("0612345678")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["link_status"], "ambiguous_phone_match");
    assert_eq!(body["is_emergency"], true);
    assert_eq!(body["registration_id"], serde_json::Value::Null);
    assert_eq!(body["message"], "Multiple registrations found for phone +31612345678");

    assert!(app.store.registrations().await.iter().all(|r| !r.paid));
}

#[tokio::test]
async fn test_orphan_payment_is_flagged() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(&payment_payload(Some("REG-404"), Some("EVT-1"), Some("0612345678")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["link_status"], "orphan_payment");
    assert_eq!(body["is_emergency"], true);
    assert_eq!(body["message"], "No matching registration found for payment");

    let payments = app.store.payments().await;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].recognized, Some(false));
}

#[tokio::test]
async fn test_payment_without_identifiers_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(&payment_payload(None, Some("EVT-1"), Some("not a phone")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Payment has neither registration_id nor valid phone number");
    assert!(app.store.payments().await.is_empty());
}

#[tokio::test]
async fn test_unconfirmed_payment_when_confirmation_required() {
    let mut tally = tally_config(false);
    tally.payment_submission_means_paid = false;
    let app = TestApp::with_tally(tally);
    app.post_json(&signup_payload(Some("REG-1"), "EVT-1", "0612345678", "ada@example.com"))
        .await;

    let (status, body) = app.post_json(&payment_payload(Some("REG-1"), None, None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "payment not confirmed");
    assert_eq!(body["link_status"], serde_json::Value::Null);
    assert_eq!(body["is_emergency"], false);

    assert!(!app.store.registrations().await[0].paid);
    assert_eq!(app.store.payments().await.len(), 1);
}
