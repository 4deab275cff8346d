//! Field mapping layer.
//!
//! Each form maps logical field names to the Tally keys/labels that may carry
//! them, so a Tally form can be edited without touching business logic.
//! Candidates are tried in order; for each candidate the field key is checked
//! before the label.

/// Logical name plus its candidate keys/labels, in order of preference
pub type FieldMap = &'static [(&'static str, &'static [&'static str])];

pub const SIGNUP_FIELD_MAP: FieldMap = &[
    // Hidden fields (set by URL parameters)
    ("registration_id", &["registration_id", "registrationId", "Registration ID"]),
    ("event_id", &["event_id", "eventId", "Event ID"]),
    // User-provided fields
    ("phone", &["phone", "Phone", "phone_number", "Phone Number", "Mobile"]),
    ("email", &["email", "Email", "email_address", "Email Address"]),
    ("full_name", &["full_name", "name", "Name", "Full Name", "Your Name"]),
];

pub const PAYMENT_FIELD_MAP: FieldMap = &[
    // Hidden fields
    ("registration_id", &["registration_id", "registrationId", "Registration ID"]),
    ("event_id", &["event_id", "eventId", "Event ID"]),
    // User-provided fields
    (
        "phone",
        &[
            "phone",
            "Phone",
            "phone_number",
            "Phone Number",
            "Mobile",
            "What's the phone number you signed up with?",
        ],
    ),
    (
        "email",
        &[
            "email",
            "Email",
            "email_address",
            "Email Address",
            "Reserve your drink! (email)",
        ],
    ),
    ("payment_status", &["payment_status", "paymentStatus", "Payment Status"]),
];

/// Signup answer: the Tally question key, then a fragment of its label
pub struct AnswerField {
    pub name: &'static str,
    pub key: &'static str,
    pub label_fragment: &'static str,
}

const fn answer(name: &'static str, key: &'static str, label_fragment: &'static str) -> AnswerField {
    AnswerField {
        name,
        key,
        label_fragment,
    }
}

pub const SIGNUP_ANSWER_FIELDS: &[AnswerField] = &[
    answer("first_name", "question_EQROMA", "What's your first name?"),
    answer("phone", "question_rA4Zvp", "Whats your phone number?"),
    answer("first_time", "question_4x6bzd", "First time at Stranger Beers?"),
    answer("age", "question_72AkM6", "How old are you?"),
    answer("gender", "question_jQRVvY", "How do you identify?"),
    answer("country", "question_62lBMo", "Where are you from"),
    answer("background", "question_ALgXyo", "What's your background"),
    answer("creative_expression_score", "question_2NW67g", "creative expression"),
    answer("social_anxiety_score", "question_xaqWvE", "feel nervous"),
    answer("emotional_intuition_score", "question_NWjZdN", "emotional intuition"),
    answer("solitary_preference_score", "question_Z67BDA", "solitary hobbies"),
    answer("interests_active_outdoors", "question_qArlv8", "Active & Outdoors"),
    answer("interests_creativity", "question_Q5ZQkl", "Creativity & Expression"),
    answer("interests_intellectual", "question_9DkKMK", "Intellectual & Curious"),
    answer("interests_food_social", "question_eeJXvJ", "Food & Social"),
    answer("interests_games", "question_W5W71L", "Games & Collecting"),
    answer("interests_mind_self", "question_aYLMvW", "Mind & Self"),
    answer("mbti", "question_bxpJv0", "MBTI"),
    answer("optional_note", "question_BkyRe4", "One last"),
];

/// Label fragment of the payment form's completion question
pub const PAYMENT_STATUS_LABEL: &str = "All done";

/// Tally field types whose values are option ids
pub const CHOICE_FIELD_TYPES: &[&str] = &["MULTIPLE_CHOICE", "DROPDOWN", "MULTI_SELECT"];

pub const LINEAR_SCALE_FIELD_TYPE: &str = "LINEAR_SCALE";

/// Candidate keys/labels for a logical field, empty when unmapped
pub fn candidates(map: FieldMap, logical_name: &str) -> &'static [&'static str] {
    map.iter()
        .find(|(name, _)| *name == logical_name)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}
