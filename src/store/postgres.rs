use super::{IngestionStore, RecordedPayment, SavedSignup};
use crate::error::RepositoryError;
use crate::models::{NewPayment, PaymentLink, Registration, RegistrationSignup, SignupAnswers};
use crate::repositories::{PaymentRepository, RegistrationRepository, SignupRepository};
use async_trait::async_trait;
use sqlx::PgPool;

/// Postgres-backed store built from the repositories
pub struct PgStore {
    pool: PgPool,
    registration_repo: RegistrationRepository,
    signup_repo: SignupRepository,
    payment_repo: PaymentRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            registration_repo: RegistrationRepository::new(pool.clone()),
            signup_repo: SignupRepository::new(pool.clone()),
            payment_repo: PaymentRepository::new(),
            pool,
        }
    }
}

#[async_trait]
impl IngestionStore for PgStore {
    async fn find_registration(&self, registration_id: &str) -> Result<Option<Registration>, RepositoryError> {
        self.registration_repo.find_by_id(registration_id).await
    }

    async fn find_registrations_by_event_and_phone(
        &self,
        event_id: &str,
        phone_e164: &str,
    ) -> Result<Vec<Registration>, RepositoryError> {
        self.registration_repo
            .find_by_event_and_phone(event_id, phone_e164)
            .await
    }

    async fn save_signup(
        &self,
        signup: &RegistrationSignup,
        answers: &SignupAnswers,
    ) -> Result<SavedSignup, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing = self
            .registration_repo
            .find_by_id_for_update(&mut *tx, &signup.registration_id)
            .await?;
        let registration = self.registration_repo.upsert_signup(&mut *tx, signup).await?;
        let logged = self.signup_repo.create(&mut *tx, answers).await?;

        tx.commit().await?;

        Ok(SavedSignup {
            registration,
            signup: logged,
            is_new: existing.is_none(),
        })
    }

    async fn signup_phone_exists(&self, phone: &str) -> Result<bool, RepositoryError> {
        self.signup_repo.exists_with_phone(phone).await
    }

    async fn record_payment(
        &self,
        payment: &NewPayment,
        link: Option<&PaymentLink>,
    ) -> Result<RecordedPayment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let registration = match link {
            Some(link) => self.registration_repo.mark_paid(&mut *tx, link).await?,
            None => None,
        };
        let logged = self.payment_repo.create(&mut *tx, payment).await?;

        tx.commit().await?;

        Ok(RecordedPayment {
            payment: logged,
            registration,
        })
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
