use crate::error::RepositoryError;
use crate::models::{NewPayment, Payment};
use sqlx::{Executor, Postgres};

/// Repository for the payment submission log.
///
/// Rows are only ever appended as part of a webhook transaction, so the
/// repository holds no pool of its own.
#[derive(Default)]
pub struct PaymentRepository;

impl PaymentRepository {
    pub fn new() -> Self {
        Self
    }

    /// Append a payment submission
    pub async fn create<'e, E>(&self, executor: E, payment: &NewPayment) -> Result<Payment, RepositoryError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (phone, status, recognized)
            VALUES ($1, $2, $3)
            RETURNING id, arrived_at, phone, status, recognized
            "#,
        )
        .bind(&payment.phone)
        .bind(&payment.status)
        .bind(payment.recognized)
        .fetch_one(executor)
        .await?;

        Ok(created)
    }
}
