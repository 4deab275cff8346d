//! Phone number normalization to E.164.

use phonenumber::{country, Mode};

/// Normalize a phone number to E.164 format.
///
/// `default_region` (ISO 3166-1 alpha-2, e.g. "NL") is used for numbers
/// entered without a country code. Returns `None` for empty, unparseable
/// or invalid numbers.
///
/// ```
/// use stranger_beers_ingestion::phone::normalize_phone;
///
/// assert_eq!(normalize_phone("06 12345678", "NL").as_deref(), Some("+31612345678"));
/// assert_eq!(normalize_phone("invalid", "NL"), None);
/// ```
pub fn normalize_phone(phone: &str, default_region: &str) -> Option<String> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return None;
    }

    let region = default_region.trim().to_uppercase().parse::<country::Id>().ok();
    let parsed = phonenumber::parse(region, trimmed).ok()?;
    if !phonenumber::is_valid(&parsed) {
        return None;
    }

    Some(parsed.format().mode(Mode::E164).to_string())
}

/// Check if a phone number is valid
pub fn is_valid_phone(phone: &str, default_region: &str) -> bool {
    normalize_phone(phone, default_region).is_some()
}
