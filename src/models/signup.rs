use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Answers pulled out of a signup form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SignupAnswers {
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub first_time: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub background: Option<String>,
    pub creative_expression_score: Option<i32>,
    pub social_anxiety_score: Option<i32>,
    pub emotional_intuition_score: Option<i32>,
    pub solitary_preference_score: Option<i32>,
    pub interests_active_outdoors: Option<String>,
    pub interests_creativity: Option<String>,
    pub interests_intellectual: Option<String>,
    pub interests_food_social: Option<String>,
    pub interests_games: Option<String>,
    pub interests_mind_self: Option<String>,
    pub mbti: Option<String>,
    pub optional_note: Option<String>,
}

/// Row in the `signups` submission log
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Signup {
    pub id: i64,
    pub received_at: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub answers: SignupAnswers,
}
