use crate::error::{AppError, AppResult};
use crate::models::{NewPayment, PaymentLink, PaymentLinkStatus, Registration};
use crate::store::IngestionStore;
use crate::tally::ParsedPayment;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// `payment_status` answers that confirm a payment
pub const CONFIRMED_PAYMENT_STATUSES: &[&str] = &["paid", "completed", "succeeded", "success", "yes", "true"];

/// Result of processing a payment submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    /// Registration the payment was linked to
    pub registration_id: Option<String>,
    /// None when the payment was logged but not linked
    pub link_status: Option<PaymentLinkStatus>,
    pub is_emergency: bool,
    pub message: String,
}

impl PaymentOutcome {
    fn linked(registration: &Registration, status: PaymentLinkStatus) -> Self {
        Self {
            registration_id: Some(registration.registration_id.clone()),
            link_status: Some(status),
            is_emergency: status.is_emergency(),
            message: "paid".to_string(),
        }
    }

    fn emergency(status: PaymentLinkStatus, message: String) -> Self {
        Self {
            registration_id: None,
            link_status: Some(status),
            is_emergency: status.is_emergency(),
            message,
        }
    }

    fn orphan() -> Self {
        Self::emergency(
            PaymentLinkStatus::OrphanPayment,
            "No matching registration found for payment".to_string(),
        )
    }
}

/// Where a confirmed payment should go
enum Resolution {
    Link {
        registration_id: String,
        status: PaymentLinkStatus,
    },
    Emergency(PaymentOutcome),
}

/// Service for payment form submissions.
///
/// Links a payment to a registration, trying the registration id first and
/// then the (event, phone) pair. Payments that cannot be tied to exactly one
/// registration are accepted and flagged as emergencies.
pub struct PaymentService {
    store: Arc<dyn IngestionStore>,
    payment_submission_means_paid: bool,
}

impl PaymentService {
    pub fn new(store: Arc<dyn IngestionStore>, payment_submission_means_paid: bool) -> Self {
        Self {
            store,
            payment_submission_means_paid,
        }
    }

    fn is_confirmed(&self, parsed: &ParsedPayment) -> bool {
        if self.payment_submission_means_paid {
            return true;
        }
        parsed
            .payment_status
            .as_deref()
            .map(|status| {
                let status = status.trim().to_lowercase();
                CONFIRMED_PAYMENT_STATUSES.contains(&status.as_str())
            })
            .unwrap_or(false)
    }

    pub async fn process(&self, parsed: &ParsedPayment, body_hash: &str) -> AppResult<PaymentOutcome> {
        info!(
            registration_id = ?parsed.registration_id,
            phone = ?parsed.phone_e164,
            event_id = ?parsed.event_id,
            body_hash,
            "Processing payment submission"
        );

        if parsed.registration_id.is_none() && parsed.phone_e164.is_none() {
            let message = "Payment has neither registration_id nor valid phone number";
            error!(body_hash, "{}", message);
            return Err(AppError::Validation(message.to_string()));
        }

        let log_row = self.log_row(parsed).await?;

        if !self.is_confirmed(parsed) {
            self.record(&log_row, None).await?;
            warn!(
                payment_status = ?parsed.payment_status,
                "Payment submission without confirmed status, not linking"
            );
            return Ok(PaymentOutcome {
                registration_id: None,
                link_status: None,
                is_emergency: false,
                message: "payment not confirmed".to_string(),
            });
        }

        match self.resolve(parsed).await? {
            Resolution::Link {
                registration_id,
                status,
            } => {
                let link = PaymentLink {
                    registration_id,
                    payment_payload: parsed.raw_payload.clone(),
                    claimed_registration_id: parsed.registration_id.clone(),
                    claimed_phone_e164: parsed.phone_e164.clone(),
                    status,
                    received_at: Utc::now(),
                };
                match self.record(&log_row, Some(&link)).await? {
                    Some(registration) => Ok(PaymentOutcome::linked(&registration, status)),
                    None => {
                        error!(
                            registration_id = %link.registration_id,
                            "EMERGENCY: Matched registration disappeared before payment was recorded"
                        );
                        Ok(PaymentOutcome::orphan())
                    }
                }
            }
            Resolution::Emergency(outcome) => {
                self.record(&log_row, None).await?;
                Ok(outcome)
            }
        }
    }

    /// Pick the registration a confirmed payment belongs to
    async fn resolve(&self, parsed: &ParsedPayment) -> AppResult<Resolution> {
        if let Some(registration_id) = parsed.registration_id.as_deref() {
            if self.store.find_registration(registration_id).await?.is_some() {
                info!(registration_id, "Payment matched by registration_id");
                return Ok(Resolution::Link {
                    registration_id: registration_id.to_string(),
                    status: PaymentLinkStatus::MatchedByRegistrationId,
                });
            }
        }

        if let (Some(event_id), Some(phone)) = (parsed.event_id.as_deref(), parsed.phone_e164.as_deref()) {
            let matches = self
                .store
                .find_registrations_by_event_and_phone(event_id, phone)
                .await?;

            if let [registration] = matches.as_slice() {
                info!(
                    phone,
                    registration_id = %registration.registration_id,
                    "Payment matched by phone"
                );
                return Ok(Resolution::Link {
                    registration_id: registration.registration_id.clone(),
                    status: PaymentLinkStatus::MatchedByPhone,
                });
            }

            if matches.len() > 1 {
                let ids: Vec<&str> = matches.iter().map(|r| r.registration_id.as_str()).collect();
                error!(
                    phone,
                    event_id,
                    matches = ?ids,
                    "EMERGENCY: Ambiguous phone match"
                );
                return Ok(Resolution::Emergency(PaymentOutcome::emergency(
                    PaymentLinkStatus::AmbiguousPhoneMatch,
                    format!("Multiple registrations found for phone {}", phone),
                )));
            }
        }

        error!(
            registration_id = ?parsed.registration_id,
            phone = ?parsed.phone_e164,
            event_id = ?parsed.event_id,
            "EMERGENCY: Orphan payment"
        );
        Ok(Resolution::Emergency(PaymentOutcome::orphan()))
    }

    /// Build the payments log row for a submission
    async fn log_row(&self, parsed: &ParsedPayment) -> AppResult<NewPayment> {
        let phone = parsed.phone_e164.clone().or_else(|| parsed.phone_raw.clone());
        let recognized = match phone.as_deref() {
            Some(phone) => self.store.signup_phone_exists(phone).await?,
            None => false,
        };

        Ok(NewPayment {
            phone,
            status: parsed.completion_status.clone(),
            recognized,
        })
    }

    /// Append the log row, marking the linked registration paid in the same write
    async fn record(&self, log_row: &NewPayment, link: Option<&PaymentLink>) -> AppResult<Option<Registration>> {
        let recorded = self.store.record_payment(log_row, link).await?;
        info!(
            payment_id = recorded.payment.id,
            recognized = log_row.recognized,
            "Logged payment submission"
        );
        Ok(recorded.registration)
    }
}
