//! Storage seam between the ingestion services and the database.
//!
//! `PgStore` is the production backend. `MemoryStore` keeps everything in
//! process and backs `serve --memory-store` and the test suite.
//!
//! Each webhook's registration write and its log row are applied together:
//! either both land or neither does. Writes only touch the columns their
//! form owns, so a signup never overwrites payment state and vice versa.

pub mod memory;
pub mod postgres;

use crate::error::RepositoryError;
use crate::models::{
    NewPayment, Payment, PaymentLink, Registration, RegistrationSignup, Signup, SignupAnswers,
};
use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Registration and log row written for one signup submission
#[derive(Debug, Clone)]
pub struct SavedSignup {
    pub registration: Registration,
    pub signup: Signup,
    /// No registration existed with this id before
    pub is_new: bool,
}

/// Log row written for one payment submission, plus the registration it paid
#[derive(Debug, Clone)]
pub struct RecordedPayment {
    pub payment: Payment,
    /// None when no link was requested or the registration is gone
    pub registration: Option<Registration>,
}

#[async_trait]
pub trait IngestionStore: Send + Sync {
    async fn find_registration(&self, registration_id: &str) -> Result<Option<Registration>, RepositoryError>;

    /// Registrations for an event sharing an E.164 phone number
    async fn find_registrations_by_event_and_phone(
        &self,
        event_id: &str,
        phone_e164: &str,
    ) -> Result<Vec<Registration>, RepositoryError>;

    /// Create or refresh a registration from a signup and append the answers
    /// to the signups log
    async fn save_signup(
        &self,
        signup: &RegistrationSignup,
        answers: &SignupAnswers,
    ) -> Result<SavedSignup, RepositoryError>;

    async fn signup_phone_exists(&self, phone: &str) -> Result<bool, RepositoryError>;

    /// Append a payment to the payments log, marking the linked registration
    /// as paid when a link is given
    async fn record_payment(
        &self,
        payment: &NewPayment,
        link: Option<&PaymentLink>,
    ) -> Result<RecordedPayment, RepositoryError>;

    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> Result<(), RepositoryError>;
}
