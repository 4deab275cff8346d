#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use async_trait::async_trait;
use stranger_beers_ingestion::config::{AppConfig, TallyConfig};
use stranger_beers_ingestion::error::RepositoryError;
use stranger_beers_ingestion::models::{
    NewPayment, PaymentLink, Registration, RegistrationSignup, SignupAnswers,
};
use stranger_beers_ingestion::store::{RecordedPayment, SavedSignup};
use stranger_beers_ingestion::{create_router, AppState, IngestionStore, MemoryStore};
use tower::ServiceExt;

pub const SIGNUP_FORM_ID: &str = "signupForm";
pub const PAYMENT_FORM_ID: &str = "paymentForm";
pub const SIGNUP_SECRET: &str = "signup-secret";
pub const PAYMENT_SECRET: &str = "payment-secret";

/// Tally settings matching the payload builders below
pub fn tally_config(verify_signature: bool) -> TallyConfig {
    TallyConfig {
        signup_form_id: SIGNUP_FORM_ID.to_string(),
        payment_form_id: PAYMENT_FORM_ID.to_string(),
        verify_signature,
        signup_secret: SIGNUP_SECRET.to_string(),
        payment_secret: PAYMENT_SECRET.to_string(),
        default_phone_region: "NL".to_string(),
        payment_submission_means_paid: true,
    }
}

/// Router over an in-memory store, plus the store for assertions
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_tally(tally_config(false))
    }

    pub fn with_tally(tally: TallyConfig) -> Self {
        let config = AppConfig {
            tally,
            ..AppConfig::default()
        };
        let store = Arc::new(MemoryStore::new());
        let state = Arc::new(AppState::new(config, store.clone()));
        Self {
            router: create_router(state),
            store,
        }
    }

    /// Router over a store whose database cannot be reached. `store` stays
    /// empty.
    pub fn unavailable() -> Self {
        let config = AppConfig {
            tally: tally_config(false),
            ..AppConfig::default()
        };
        let state = Arc::new(AppState::new(config, Arc::new(UnavailableStore)));
        Self {
            router: create_router(state),
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_webhook(&self, body: &[u8], signature: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhooks/tally")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header("tally-signature", signature);
        }
        self.send(builder.body(Body::from(body.to_vec())).unwrap()).await
    }

    pub async fn post_json(&self, payload: &Value) -> (StatusCode, Value) {
        self.post_webhook(payload.to_string().as_bytes(), None).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

/// Signup webhook in the shape Tally sends it
pub fn signup_payload(registration_id: Option<&str>, event_id: &str, phone: &str, email: &str) -> Value {
    let mut fields = vec![
        json!({"key": "event_id", "label": "event_id", "type": "HIDDEN_FIELDS", "value": event_id}),
        json!({"key": "question_EQROMA", "label": "What's your first name?", "type": "INPUT_TEXT", "value": "Ada"}),
        json!({"key": "question_rA4Zvp", "label": "Whats your phone number?", "type": "INPUT_PHONE_NUMBER", "value": phone}),
        json!({"key": "question_email", "label": "Email", "type": "INPUT_EMAIL", "value": email}),
        json!({"key": "question_2NW67g", "label": "I enjoy creative expression", "type": "LINEAR_SCALE", "value": 4}),
    ];
    if let Some(id) = registration_id {
        fields.push(json!({"key": "registration_id", "label": "registration_id", "type": "HIDDEN_FIELDS", "value": id}));
    }

    json!({
        "eventId": "evt-webhook",
        "eventType": "FORM_RESPONSE",
        "data": {
            "formId": SIGNUP_FORM_ID,
            "responseId": "resp-signup",
            "fields": fields
        }
    })
}

/// Payment webhook; pass `None` to leave an identifier out
pub fn payment_payload(registration_id: Option<&str>, event_id: Option<&str>, phone: Option<&str>) -> Value {
    let mut fields = vec![json!({
        "key": "question_done",
        "label": "All done?",
        "type": "MULTIPLE_CHOICE",
        "value": ["opt-yes"],
        "options": [{"id": "opt-yes", "text": "Yes, I paid"}, {"id": "opt-no", "text": "Not yet"}]
    })];
    if let Some(id) = registration_id {
        fields.push(json!({"key": "registration_id", "label": "registration_id", "type": "HIDDEN_FIELDS", "value": id}));
    }
    if let Some(id) = event_id {
        fields.push(json!({"key": "event_id", "label": "event_id", "type": "HIDDEN_FIELDS", "value": id}));
    }
    if let Some(phone) = phone {
        fields.push(json!({
            "key": "question_phone",
            "label": "What's the phone number you signed up with?",
            "type": "INPUT_PHONE_NUMBER",
            "value": phone
        }));
    }

    json!({
        "eventType": "FORM_RESPONSE",
        "data": {
            "formId": PAYMENT_FORM_ID,
            "submissionId": "sub-payment",
            "fields": fields
        }
    })
}

/// Store that fails every call the way a lost database connection does
pub struct UnavailableStore;

fn connection_lost() -> RepositoryError {
    RepositoryError::Query(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl IngestionStore for UnavailableStore {
    async fn find_registration(&self, _: &str) -> Result<Option<Registration>, RepositoryError> {
        Err(connection_lost())
    }

    async fn find_registrations_by_event_and_phone(
        &self,
        _: &str,
        _: &str,
    ) -> Result<Vec<Registration>, RepositoryError> {
        Err(connection_lost())
    }

    async fn save_signup(
        &self,
        _: &RegistrationSignup,
        _: &SignupAnswers,
    ) -> Result<SavedSignup, RepositoryError> {
        Err(connection_lost())
    }

    async fn signup_phone_exists(&self, _: &str) -> Result<bool, RepositoryError> {
        Err(connection_lost())
    }

    async fn record_payment(
        &self,
        _: &NewPayment,
        _: Option<&PaymentLink>,
    ) -> Result<RecordedPayment, RepositoryError> {
        Err(connection_lost())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(connection_lost())
    }
}
