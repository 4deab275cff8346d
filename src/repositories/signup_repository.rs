use crate::error::RepositoryError;
use crate::models::{Signup, SignupAnswers};
use sqlx::{Executor, PgPool, Postgres};

/// Repository for the signup submission log
pub struct SignupRepository {
    pool: PgPool,
}

impl SignupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a signup submission
    pub async fn create<'e, E>(&self, executor: E, answers: &SignupAnswers) -> Result<Signup, RepositoryError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signup = sqlx::query_as::<_, Signup>(
            r#"
            INSERT INTO signups (
                first_name, phone, first_time, age, gender, country, background,
                creative_expression_score, social_anxiety_score,
                emotional_intuition_score, solitary_preference_score,
                interests_active_outdoors, interests_creativity, interests_intellectual,
                interests_food_social, interests_games, interests_mind_self,
                mbti, optional_note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(&answers.first_name)
        .bind(&answers.phone)
        .bind(&answers.first_time)
        .bind(&answers.age)
        .bind(&answers.gender)
        .bind(&answers.country)
        .bind(&answers.background)
        .bind(answers.creative_expression_score)
        .bind(answers.social_anxiety_score)
        .bind(answers.emotional_intuition_score)
        .bind(answers.solitary_preference_score)
        .bind(&answers.interests_active_outdoors)
        .bind(&answers.interests_creativity)
        .bind(&answers.interests_intellectual)
        .bind(&answers.interests_food_social)
        .bind(&answers.interests_games)
        .bind(&answers.interests_mind_self)
        .bind(&answers.mbti)
        .bind(&answers.optional_note)
        .fetch_one(executor)
        .await?;

        Ok(signup)
    }

    /// Check if a phone number appears in the signup log
    pub async fn exists_with_phone(&self, phone: &str) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM signups WHERE phone = $1)")
            .bind(phone)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}
