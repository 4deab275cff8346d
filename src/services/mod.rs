pub mod payment_service;
pub mod signup_service;

pub use payment_service::{PaymentOutcome, PaymentService, CONFIRMED_PAYMENT_STATUSES};
pub use signup_service::{SignupOutcome, SignupService};
