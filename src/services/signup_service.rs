use crate::error::AppResult;
use crate::models::RegistrationSignup;
use crate::store::IngestionStore;
use crate::tally::ParsedSignup;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Result of processing a signup submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupOutcome {
    pub registration_id: String,
    pub is_new: bool,
}

impl SignupOutcome {
    pub fn message(&self) -> &'static str {
        if self.is_new {
            "created"
        } else {
            "updated"
        }
    }
}

/// Service for signup form submissions.
///
/// Creates or refreshes the registration and appends the answers to the
/// signups log. Never marks a registration as paid.
pub struct SignupService {
    store: Arc<dyn IngestionStore>,
}

fn generated_id(prefix: &str, len: usize) -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-{}", prefix, &hex[..len])
}

impl SignupService {
    pub fn new(store: Arc<dyn IngestionStore>) -> Self {
        Self { store }
    }

    pub async fn process(&self, parsed: &ParsedSignup, body_hash: &str) -> AppResult<SignupOutcome> {
        let registration_id = match parsed.registration_id.clone() {
            Some(id) => id,
            None => {
                let id = generated_id("REG", 12);
                info!(registration_id = %id, "Generated registration_id");
                id
            }
        };
        let event_id = match parsed.event_id.clone() {
            Some(id) => id,
            None => {
                let id = generated_id("EVT", 8);
                info!(event_id = %id, "Generated event_id");
                id
            }
        };

        let signup = RegistrationSignup {
            registration_id: registration_id.clone(),
            event_id,
            email: parsed.email.clone(),
            phone_e164: parsed.phone_e164.clone(),
            full_name: parsed.full_name.clone(),
            signup_payload: parsed.raw_payload.clone(),
            received_at: Utc::now(),
        };
        let saved = self.store.save_signup(&signup, &parsed.answers).await?;
        let is_new = saved.is_new;

        info!(
            registration_id = %registration_id,
            signup_id = saved.signup.id,
            is_new,
            body_hash,
            "{} registration",
            if is_new { "Created" } else { "Updated" }
        );

        Ok(SignupOutcome {
            registration_id,
            is_new,
        })
    }
}
