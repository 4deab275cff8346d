//! Tally webhook parsing and verification.

pub mod fields;
pub mod parse;
pub mod verify;

pub use parse::{
    compute_body_hash, determine_form_type, extract_field_value, extract_signup_answers,
    form_id_of, parse_submission, FormType, ParsedPayment, ParsedSignup, ParsedSubmission, TallyData,
    TallyField,
};
pub use verify::{compute_signature, verify_tally_signature, SignatureError, SIGNATURE_HEADER};
