use crate::error::RepositoryError;
use crate::models::{PaymentLink, Registration, RegistrationSignup};
use sqlx::{Executor, PgPool, Postgres};

const REGISTRATION_COLUMNS: &str = r#"
    registration_id,
    event_id,
    email,
    phone_e164,
    full_name,
    signup_payload,
    signup_received_at,
    paid,
    paid_at,
    payment_payload,
    payment_received_at,
    payment_claimed_registration_id,
    payment_claimed_phone_e164,
    payment_link_status,
    created_at,
    updated_at
"#;

/// Repository for registration data access
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    /// Create a new RegistrationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a registration by its registration id
    pub async fn find_by_id(&self, registration_id: &str) -> Result<Option<Registration>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM registrations WHERE registration_id = $1",
            REGISTRATION_COLUMNS
        );
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(registration_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(registration)
    }

    /// Find all registrations for an event with the given E.164 phone number
    pub async fn find_by_event_and_phone(
        &self,
        event_id: &str,
        phone_e164: &str,
    ) -> Result<Vec<Registration>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM registrations WHERE event_id = $1 AND phone_e164 = $2 ORDER BY created_at",
            REGISTRATION_COLUMNS
        );
        let registrations = sqlx::query_as::<_, Registration>(&sql)
            .bind(event_id)
            .bind(phone_e164)
            .fetch_all(&self.pool)
            .await?;

        Ok(registrations)
    }

    /// Lock a registration row for the rest of the transaction
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        registration_id: &str,
    ) -> Result<Option<Registration>, RepositoryError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM registrations WHERE registration_id = $1 FOR UPDATE",
            REGISTRATION_COLUMNS
        );
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(registration_id)
            .fetch_optional(executor)
            .await?;

        Ok(registration)
    }

    /// Insert a registration from a signup, or refresh the signup columns of an
    /// existing one. Payment columns keep whatever is stored.
    pub async fn upsert_signup<'e, E>(
        &self,
        executor: E,
        signup: &RegistrationSignup,
    ) -> Result<Registration, RepositoryError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO registrations (
                registration_id, event_id, email, phone_e164, full_name,
                signup_payload, signup_received_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $7)
            ON CONFLICT (registration_id) DO UPDATE SET
                event_id = EXCLUDED.event_id,
                email = EXCLUDED.email,
                phone_e164 = EXCLUDED.phone_e164,
                full_name = EXCLUDED.full_name,
                signup_payload = EXCLUDED.signup_payload,
                signup_received_at = EXCLUDED.signup_received_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            REGISTRATION_COLUMNS
        );

        let saved = sqlx::query_as::<_, Registration>(&sql)
            .bind(&signup.registration_id)
            .bind(&signup.event_id)
            .bind(&signup.email)
            .bind(&signup.phone_e164)
            .bind(&signup.full_name)
            .bind(&signup.signup_payload)
            .bind(signup.received_at)
            .fetch_one(executor)
            .await?;

        Ok(saved)
    }

    /// Set the payment columns of a registration. Returns None when the
    /// registration does not exist.
    pub async fn mark_paid<'e, E>(
        &self,
        executor: E,
        link: &PaymentLink,
    ) -> Result<Option<Registration>, RepositoryError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE registrations SET
                paid = TRUE,
                paid_at = $2,
                payment_payload = $3,
                payment_received_at = $2,
                payment_claimed_registration_id = $4,
                payment_claimed_phone_e164 = $5,
                payment_link_status = $6,
                updated_at = $2
            WHERE registration_id = $1
            RETURNING {}
            "#,
            REGISTRATION_COLUMNS
        );

        let updated = sqlx::query_as::<_, Registration>(&sql)
            .bind(&link.registration_id)
            .bind(link.received_at)
            .bind(&link.payment_payload)
            .bind(&link.claimed_registration_id)
            .bind(&link.claimed_phone_e164)
            .bind(link.status.as_str())
            .fetch_optional(executor)
            .await?;

        Ok(updated)
    }
}
