pub mod payment_repository;
pub mod registration_repository;
pub mod signup_repository;

// Re-export all repositories for convenient access
pub use payment_repository::PaymentRepository;
pub use registration_repository::RegistrationRepository;
pub use signup_repository::SignupRepository;
