//! Tally webhook payload parsing.

use super::fields::{
    candidates, FieldMap, CHOICE_FIELD_TYPES, LINEAR_SCALE_FIELD_TYPE, PAYMENT_FIELD_MAP,
    PAYMENT_STATUS_LABEL, SIGNUP_ANSWER_FIELDS, SIGNUP_FIELD_MAP,
};
use crate::config::TallyConfig;
use crate::models::SignupAnswers;
use crate::phone::normalize_phone;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// Which of our Tally forms a submission came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    Signup,
    Payment,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Signup => "signup",
            FormType::Payment => "payment",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalars are read as strings, anything else as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Entries that do not fit `T` are skipped; a non-array is absent
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Choice option attached to a Tally field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TallyOption {
    #[serde(default)]
    pub id: Value,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
}

/// One answered question in a Tally submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TallyField {
    #[serde(default, deserialize_with = "lenient_string")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(default, deserialize_with = "lenient_list")]
    pub options: Option<Vec<TallyOption>>,
}

impl TallyField {
    fn key_lower(&self) -> Option<String> {
        self.key.as_deref().filter(|k| !k.is_empty()).map(str::to_lowercase)
    }

    fn label_lower(&self) -> Option<String> {
        self.label.as_deref().filter(|l| !l.is_empty()).map(str::to_lowercase)
    }

    fn options(&self) -> &[TallyOption] {
        self.options.as_deref().unwrap_or(&[])
    }
}

/// The `data` object of a Tally webhook
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TallyData {
    #[serde(default, rename = "formId", deserialize_with = "lenient_string")]
    pub form_id: Option<String>,
    #[serde(default, rename = "submissionId", deserialize_with = "lenient_string")]
    pub submission_id: Option<String>,
    #[serde(default, rename = "responseId", deserialize_with = "lenient_string")]
    pub response_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub fields: Option<Vec<TallyField>>,
}

impl TallyData {
    /// Read the `data` object out of a webhook payload. Anything that is not
    /// an object yields an empty one; badly typed members are dropped.
    pub fn from_payload(payload: &Value) -> Self {
        match payload.get("data") {
            Some(data) if data.is_object() => serde_json::from_value(data.clone()).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Non-empty form id
    pub fn form_id(&self) -> Option<&str> {
        self.form_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Tally has used both names for the submission id
    pub fn submission_id(&self) -> Option<String> {
        self.submission_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| self.response_id.clone().filter(|id| !id.is_empty()))
    }

    pub fn fields(&self) -> &[TallyField] {
        self.fields.as_deref().unwrap_or(&[])
    }
}

/// Parsed data from a signup form submission
#[derive(Debug, Clone)]
pub struct ParsedSignup {
    pub form_id: String,
    pub submission_id: Option<String>,
    pub event_id: Option<String>,
    pub registration_id: Option<String>,
    pub phone_raw: Option<String>,
    pub phone_e164: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub answers: SignupAnswers,
    pub raw_payload: Value,
}

/// Parsed data from a payment form submission
#[derive(Debug, Clone)]
pub struct ParsedPayment {
    pub form_id: String,
    pub submission_id: Option<String>,
    pub event_id: Option<String>,
    pub registration_id: Option<String>,
    pub phone_raw: Option<String>,
    pub phone_e164: Option<String>,
    pub email: Option<String>,
    /// Explicit payment confirmation field, if the form has one
    pub payment_status: Option<String>,
    /// Answer to the "All done?" question
    pub completion_status: Option<String>,
    pub raw_payload: Value,
}

#[derive(Debug, Clone)]
pub enum ParsedSubmission {
    Signup(ParsedSignup),
    Payment(ParsedPayment),
}

/// `data.formId` of a raw webhook payload, stringified when it is not a string
pub fn form_id_of(payload: &Value) -> Option<String> {
    payload
        .get("data")
        .and_then(|data| data.get("formId"))
        .and_then(normalize_value)
}

/// Compute SHA-256 hash of the raw request body
pub fn compute_body_hash(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Determine whether a form id is our signup or payment form
pub fn determine_form_type(form_id: &str, config: &TallyConfig) -> Option<FormType> {
    if form_id.is_empty() {
        return None;
    }
    if form_id == config.signup_form_id {
        return Some(FormType::Signup);
    }
    if form_id == config.payment_form_id {
        return Some(FormType::Payment);
    }
    None
}

/// Python-style truthiness, which is how Tally payloads signal "no answer"
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalize a field value to a trimmed, non-empty string
pub fn normalize_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Array(items) => {
            // Multi-select answers are joined
            let parts: Vec<String> = items
                .iter()
                .filter(|v| is_truthy(v))
                .map(|v| value_to_string(v).trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        other => {
            let text = value_to_string(other);
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

/// Resolve option ids to their text for choice fields
pub fn resolve_option_text(field: &TallyField) -> Option<String> {
    let options = field.options();
    if !is_truthy(&field.value) || options.is_empty() {
        return normalize_value(&field.value);
    }

    let text_for = |id: &Value| -> Option<String> {
        options
            .iter()
            .find(|opt| &opt.id == id)
            .map(|opt| opt.text.clone().unwrap_or_default())
    };

    match &field.value {
        Value::Array(ids) => {
            let texts: Vec<String> = ids
                .iter()
                .map(|id| text_for(id).unwrap_or_else(|| value_to_string(id)))
                .collect();
            (!texts.is_empty()).then(|| texts.join(", "))
        }
        single => text_for(single).or_else(|| normalize_value(single)),
    }
}

/// Extract a field value using the mapping layer.
///
/// Returns the normalized value of the first candidate found, looking at the
/// field key before the label for each candidate.
pub fn extract_field_value(fields: &[TallyField], logical_name: &str, map: FieldMap) -> Option<String> {
    let possible_keys = candidates(map, logical_name);
    if possible_keys.is_empty() {
        return None;
    }

    // Later fields win on duplicate keys/labels
    let mut by_key: HashMap<String, &Value> = HashMap::new();
    let mut by_label: HashMap<String, &Value> = HashMap::new();
    for field in fields {
        if let Some(key) = field.key_lower() {
            by_key.insert(key, &field.value);
        }
        if let Some(label) = field.label_lower() {
            by_label.insert(label, &field.value);
        }
    }

    for candidate in possible_keys {
        let candidate = candidate.to_lowercase();
        if let Some(value) = by_key.get(&candidate).or_else(|| by_label.get(&candidate)) {
            return normalize_value(value);
        }
    }

    None
}

enum AnswerValue {
    Text(String),
    Int(i64),
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn find_answer_field<'a>(fields: &'a [TallyField], key: &str, label_fragment: &str) -> Option<&'a TallyField> {
    let key = key.to_lowercase();
    let fragment = label_fragment.to_lowercase();
    fields
        .iter()
        .find(|f| f.key_lower().as_deref() == Some(key.as_str()))
        .or_else(|| {
            fields
                .iter()
                .find(|f| f.label_lower().map(|l| l.contains(&fragment)).unwrap_or(false))
        })
}

fn read_answer(field: &TallyField) -> Option<AnswerValue> {
    let field_type = field.field_type.as_deref().unwrap_or("");
    if CHOICE_FIELD_TYPES.contains(&field_type) {
        resolve_option_text(field).map(AnswerValue::Text)
    } else if field_type == LINEAR_SCALE_FIELD_TYPE {
        integer_value(&field.value).map(AnswerValue::Int)
    } else {
        normalize_value(&field.value).map(AnswerValue::Text)
    }
}

fn as_text(value: Option<AnswerValue>) -> Option<String> {
    match value? {
        AnswerValue::Text(s) => Some(s),
        AnswerValue::Int(i) => Some(i.to_string()),
    }
}

fn as_score(value: Option<AnswerValue>) -> Option<i32> {
    let raw = match value? {
        AnswerValue::Int(i) => i,
        AnswerValue::Text(s) => s.parse().ok()?,
    };
    i32::try_from(raw).ok()
}

/// Extract every signup answer we keep in the signups log
pub fn extract_signup_answers(fields: &[TallyField]) -> SignupAnswers {
    let mut answers = SignupAnswers::default();

    for spec in SIGNUP_ANSWER_FIELDS {
        let value = find_answer_field(fields, spec.key, spec.label_fragment).and_then(read_answer);
        match spec.name {
            "first_name" => answers.first_name = as_text(value),
            "phone" => answers.phone = as_text(value),
            "first_time" => answers.first_time = as_text(value),
            "age" => answers.age = as_text(value),
            "gender" => answers.gender = as_text(value),
            "country" => answers.country = as_text(value),
            "background" => answers.background = as_text(value),
            "creative_expression_score" => answers.creative_expression_score = as_score(value),
            "social_anxiety_score" => answers.social_anxiety_score = as_score(value),
            "emotional_intuition_score" => answers.emotional_intuition_score = as_score(value),
            "solitary_preference_score" => answers.solitary_preference_score = as_score(value),
            "interests_active_outdoors" => answers.interests_active_outdoors = as_text(value),
            "interests_creativity" => answers.interests_creativity = as_text(value),
            "interests_intellectual" => answers.interests_intellectual = as_text(value),
            "interests_food_social" => answers.interests_food_social = as_text(value),
            "interests_games" => answers.interests_games = as_text(value),
            "interests_mind_self" => answers.interests_mind_self = as_text(value),
            "mbti" => answers.mbti = as_text(value),
            "optional_note" => answers.optional_note = as_text(value),
            _ => {}
        }
    }

    answers
}

/// Answer to the payment form's "All done?" question, options resolved
fn extract_completion_status(fields: &[TallyField]) -> Option<String> {
    let field = fields.iter().find(|f| {
        f.label
            .as_deref()
            .map(|l| l.contains(PAYMENT_STATUS_LABEL))
            .unwrap_or(false)
    })?;

    match &field.value {
        Value::Array(_) if !field.options().is_empty() => resolve_option_text(field),
        value if is_truthy(value) => Some(value_to_string(value)),
        _ => None,
    }
}

/// Parse a Tally webhook payload into the structure for its form type
pub fn parse_submission(
    data: &TallyData,
    payload: Value,
    form_type: FormType,
    default_region: &str,
) -> ParsedSubmission {
    let fields = data.fields();
    let map = match form_type {
        FormType::Signup => SIGNUP_FIELD_MAP,
        FormType::Payment => PAYMENT_FIELD_MAP,
    };

    let form_id = data.form_id().unwrap_or_default().to_string();
    let submission_id = data.submission_id();
    let event_id = extract_field_value(fields, "event_id", map);
    let registration_id = extract_field_value(fields, "registration_id", map);
    let email = extract_field_value(fields, "email", map);

    match form_type {
        FormType::Signup => {
            let mut answers = extract_signup_answers(fields);
            // The phone question may only be found through its answer key
            let phone_raw = extract_field_value(fields, "phone", map).or_else(|| answers.phone.clone());
            let phone_e164 = phone_raw
                .as_deref()
                .and_then(|raw| normalize_phone(raw, default_region));

            // Log rows store E.164 so payments can be recognized by phone
            if let Some(normalized) = answers
                .phone
                .as_deref()
                .and_then(|raw| normalize_phone(raw, default_region))
            {
                answers.phone = Some(normalized);
            }

            ParsedSubmission::Signup(ParsedSignup {
                form_id,
                submission_id,
                event_id,
                registration_id,
                phone_raw,
                phone_e164,
                email,
                full_name: extract_field_value(fields, "full_name", map),
                answers,
                raw_payload: payload,
            })
        }
        FormType::Payment => {
            let phone_raw = extract_field_value(fields, "phone", map);
            let phone_e164 = phone_raw
                .as_deref()
                .and_then(|raw| normalize_phone(raw, default_region));

            ParsedSubmission::Payment(ParsedPayment {
                form_id,
                submission_id,
                event_id,
                registration_id,
                phone_raw,
                phone_e164,
                email,
                payment_status: extract_field_value(fields, "payment_status", map),
                completion_status: extract_completion_status(fields),
                raw_payload: payload,
            })
        }
    }
}
