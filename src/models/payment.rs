use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A payment submission about to be logged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    /// E.164 when the number parsed, otherwise what the user typed
    pub phone: Option<String>,
    /// Answer to the "All done?" question
    pub status: Option<String>,
    /// Whether the phone number appears in the signups log
    pub recognized: bool,
}

/// Row in the `payments` submission log
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub arrived_at: DateTime<Utc>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub recognized: Option<bool>,
}
