//! Tally webhook signature verification.
//!
//! Tally signs each webhook body with HMAC-SHA256 using the form's signing
//! secret and sends the digest in the `tally-signature` header. Both hex and
//! base64 encodings of the digest are accepted.

use super::parse::FormType;
use crate::config::TallyConfig;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "tally-signature";

/// Reasons a webhook signature is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Signature verification enabled but no secret configured for {0} form")]
    MissingSecret(FormType),

    #[error("Missing tally-signature header")]
    MissingHeader,

    #[error("Invalid signature")]
    Invalid,
}

fn new_mac(secret: &str, body: &[u8]) -> HmacSha256 {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts any key length");
    mac.update(body);
    mac
}

/// Hex-encoded HMAC-SHA256 of the body
pub fn compute_signature(body: &[u8], secret: &str) -> String {
    hex::encode(new_mac(secret, body).finalize().into_bytes())
}

/// Decode a signature header as hex, falling back to base64
fn decode_signature(header: &str) -> Option<Vec<u8>> {
    let header = header.trim();
    if header.len() == 64 {
        if let Ok(bytes) = hex::decode(header) {
            return Some(bytes);
        }
    }
    STANDARD.decode(header).ok()
}

/// Verify the Tally webhook signature for a routed form.
///
/// Always passes when verification is disabled in config.
pub fn verify_tally_signature(
    body: &[u8],
    signature_header: Option<&str>,
    form_type: FormType,
    config: &TallyConfig,
) -> Result<(), SignatureError> {
    if !config.verify_signature {
        return Ok(());
    }

    let secret = match form_type {
        FormType::Signup => config.signup_secret.as_str(),
        FormType::Payment => config.payment_secret.as_str(),
    };
    if secret.is_empty() {
        return Err(SignatureError::MissingSecret(form_type));
    }

    let header = signature_header
        .filter(|h| !h.trim().is_empty())
        .ok_or(SignatureError::MissingHeader)?;

    let provided = decode_signature(header).ok_or(SignatureError::Invalid)?;

    // verify_slice compares in constant time
    new_mac(secret, body)
        .verify_slice(&provided)
        .map_err(|_| SignatureError::Invalid)
}
