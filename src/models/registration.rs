use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// How a payment submission was tied to a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentLinkStatus {
    Unpaid,
    MatchedByRegistrationId,
    MatchedByPhone,
    OrphanPayment,
    AmbiguousPhoneMatch,
}

impl PaymentLinkStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "unpaid" => Ok(PaymentLinkStatus::Unpaid),
            "matched_by_registration_id" => Ok(PaymentLinkStatus::MatchedByRegistrationId),
            "matched_by_phone" => Ok(PaymentLinkStatus::MatchedByPhone),
            "orphan_payment" => Ok(PaymentLinkStatus::OrphanPayment),
            "ambiguous_phone_match" => Ok(PaymentLinkStatus::AmbiguousPhoneMatch),
            _ => Err(format!("Invalid payment link status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentLinkStatus::Unpaid => "unpaid",
            PaymentLinkStatus::MatchedByRegistrationId => "matched_by_registration_id",
            PaymentLinkStatus::MatchedByPhone => "matched_by_phone",
            PaymentLinkStatus::OrphanPayment => "orphan_payment",
            PaymentLinkStatus::AmbiguousPhoneMatch => "ambiguous_phone_match",
        }
    }

    /// Orphan and ambiguous payments need a human to sort them out
    pub fn is_emergency(&self) -> bool {
        matches!(
            self,
            PaymentLinkStatus::OrphanPayment | PaymentLinkStatus::AmbiguousPhoneMatch
        )
    }
}

/// Columns a signup submission owns on a registration
#[derive(Debug, Clone)]
pub struct RegistrationSignup {
    pub registration_id: String,
    pub event_id: String,
    pub email: Option<String>,
    pub phone_e164: Option<String>,
    pub full_name: Option<String>,
    pub signup_payload: Value,
    pub received_at: DateTime<Utc>,
}

/// Columns a linked payment submission owns on a registration
#[derive(Debug, Clone)]
pub struct PaymentLink {
    pub registration_id: String,
    pub payment_payload: Value,
    /// What the payment form claimed, kept for auditing the link
    pub claimed_registration_id: Option<String>,
    pub claimed_phone_e164: Option<String>,
    pub status: PaymentLinkStatus,
    pub received_at: DateTime<Utc>,
}

/// A registration for a Stranger Beers event.
///
/// Created/updated by the signup form webhook, marked as paid by the
/// payment form webhook.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    /// Text id from the Tally hidden field (or generated on signup)
    pub registration_id: String,
    pub event_id: String,
    pub email: Option<String>,
    pub phone_e164: Option<String>,
    pub full_name: Option<String>,
    pub signup_payload: Option<Value>,
    pub signup_received_at: Option<DateTime<Utc>>,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_payload: Option<Value>,
    pub payment_received_at: Option<DateTime<Utc>>,
    /// What the payment form claimed, kept for auditing the link
    pub payment_claimed_registration_id: Option<String>,
    pub payment_claimed_phone_e164: Option<String>,
    pub payment_link_status: String, // Stored as TEXT, use PaymentLinkStatus for type safety
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Create a new, unpaid registration
    pub fn new(registration_id: String, event_id: String) -> Self {
        let now = Utc::now();
        Self {
            registration_id,
            event_id,
            email: None,
            phone_e164: None,
            full_name: None,
            signup_payload: None,
            signup_received_at: None,
            paid: false,
            paid_at: None,
            payment_payload: None,
            payment_received_at: None,
            payment_claimed_registration_id: None,
            payment_claimed_phone_e164: None,
            payment_link_status: PaymentLinkStatus::Unpaid.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Get link status as an enum
    pub fn link_status(&self) -> PaymentLinkStatus {
        PaymentLinkStatus::from_str(&self.payment_link_status).unwrap_or(PaymentLinkStatus::Unpaid)
    }

    /// Overwrite the signup columns; payment columns are left alone
    pub fn apply_signup(&mut self, signup: &RegistrationSignup) {
        self.event_id = signup.event_id.clone();
        self.email = signup.email.clone();
        self.phone_e164 = signup.phone_e164.clone();
        self.full_name = signup.full_name.clone();
        self.signup_payload = Some(signup.signup_payload.clone());
        self.signup_received_at = Some(signup.received_at);
        self.updated_at = signup.received_at;
    }

    /// Record a linked payment; signup columns are left alone
    pub fn mark_paid(&mut self, link: &PaymentLink) {
        self.paid = true;
        self.paid_at = Some(link.received_at);
        self.payment_payload = Some(link.payment_payload.clone());
        self.payment_received_at = Some(link.received_at);
        self.payment_claimed_registration_id = link.claimed_registration_id.clone();
        self.payment_claimed_phone_e164 = link.claimed_phone_e164.clone();
        self.payment_link_status = link.status.as_str().to_string();
        self.updated_at = link.received_at;
    }
}
