//! Domain models for the ingestion service.
//!
//! Registrations are the long-lived records; signups and payments are
//! append-only logs of what each form submission contained.

pub mod payment;
pub mod registration;
pub mod signup;

// Re-export all models for convenient access
pub use payment::{NewPayment, Payment};
pub use registration::{PaymentLink, PaymentLinkStatus, Registration, RegistrationSignup};
pub use signup::{Signup, SignupAnswers};
