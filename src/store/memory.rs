use super::{IngestionStore, RecordedPayment, SavedSignup};
use crate::error::RepositoryError;
use crate::models::{
    NewPayment, Payment, PaymentLink, Registration, RegistrationSignup, Signup, SignupAnswers,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    registrations: BTreeMap<String, Registration>,
    signups: Vec<Signup>,
    payments: Vec<Payment>,
}

/// In-process store; contents are lost when it is dropped
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all registrations ordered by id
    pub async fn registrations(&self) -> Vec<Registration> {
        self.tables.read().await.registrations.values().cloned().collect()
    }

    /// Snapshot of the signup log
    pub async fn signups(&self) -> Vec<Signup> {
        self.tables.read().await.signups.clone()
    }

    /// Snapshot of the payment log
    pub async fn payments(&self) -> Vec<Payment> {
        self.tables.read().await.payments.clone()
    }
}

#[async_trait]
impl IngestionStore for MemoryStore {
    async fn find_registration(&self, registration_id: &str) -> Result<Option<Registration>, RepositoryError> {
        Ok(self.tables.read().await.registrations.get(registration_id).cloned())
    }

    async fn find_registrations_by_event_and_phone(
        &self,
        event_id: &str,
        phone_e164: &str,
    ) -> Result<Vec<Registration>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut matches: Vec<Registration> = tables
            .registrations
            .values()
            .filter(|r| r.event_id == event_id && r.phone_e164.as_deref() == Some(phone_e164))
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.created_at);
        Ok(matches)
    }

    async fn save_signup(
        &self,
        signup: &RegistrationSignup,
        answers: &SignupAnswers,
    ) -> Result<SavedSignup, RepositoryError> {
        let mut tables = self.tables.write().await;

        let is_new = !tables.registrations.contains_key(&signup.registration_id);
        let registration = {
            let entry = tables
                .registrations
                .entry(signup.registration_id.clone())
                .or_insert_with(|| Registration::new(signup.registration_id.clone(), signup.event_id.clone()));
            entry.apply_signup(signup);
            entry.clone()
        };

        let logged = Signup {
            id: tables.signups.len() as i64 + 1,
            received_at: signup.received_at,
            answers: answers.clone(),
        };
        tables.signups.push(logged.clone());

        Ok(SavedSignup {
            registration,
            signup: logged,
            is_new,
        })
    }

    async fn signup_phone_exists(&self, phone: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .signups
            .iter()
            .any(|s| s.answers.phone.as_deref() == Some(phone)))
    }

    async fn record_payment(
        &self,
        payment: &NewPayment,
        link: Option<&PaymentLink>,
    ) -> Result<RecordedPayment, RepositoryError> {
        let mut tables = self.tables.write().await;

        let registration = link.and_then(|link| {
            tables.registrations.get_mut(&link.registration_id).map(|registration| {
                registration.mark_paid(link);
                registration.clone()
            })
        });

        let logged = Payment {
            id: tables.payments.len() as i64 + 1,
            arrived_at: Utc::now(),
            phone: payment.phone.clone(),
            status: payment.status.clone(),
            recognized: Some(payment.recognized),
        };
        tables.payments.push(logged.clone());

        Ok(RecordedPayment {
            payment: logged,
            registration,
        })
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentLinkStatus;
    use serde_json::json;

    fn signup(registration_id: &str, email: &str) -> RegistrationSignup {
        RegistrationSignup {
            registration_id: registration_id.into(),
            event_id: "EVT-1".into(),
            email: Some(email.into()),
            phone_e164: Some("+31612345678".into()),
            full_name: None,
            signup_payload: json!({}),
            received_at: Utc::now(),
        }
    }

    fn link(registration_id: &str) -> PaymentLink {
        PaymentLink {
            registration_id: registration_id.into(),
            payment_payload: json!({"paid": true}),
            claimed_registration_id: None,
            claimed_phone_e164: Some("+31612345678".into()),
            status: PaymentLinkStatus::MatchedByPhone,
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_signup_reports_new_then_existing() {
        let store = MemoryStore::new();

        let answers = SignupAnswers::default();
        let first = store.save_signup(&signup("REG-1", "a@example.com"), &answers).await.unwrap();
        let second = store.save_signup(&signup("REG-1", "b@example.com"), &answers).await.unwrap();

        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(second.registration.created_at, first.registration.created_at);
        assert_eq!(second.signup.id, 2);
        assert_eq!(store.registrations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_signup_and_payment_writes_keep_each_others_columns() {
        let store = MemoryStore::new();
        let answers = SignupAnswers::default();
        store.save_signup(&signup("REG-1", "a@example.com"), &answers).await.unwrap();

        let recorded = store
            .record_payment(&NewPayment::default(), Some(&link("REG-1")))
            .await
            .unwrap();
        let paid = recorded.registration.unwrap();
        assert!(paid.paid);
        assert_eq!(paid.email.as_deref(), Some("a@example.com"));

        let saved = store.save_signup(&signup("REG-1", "b@example.com"), &answers).await.unwrap();
        assert!(saved.registration.paid);
        assert_eq!(saved.registration.link_status(), PaymentLinkStatus::MatchedByPhone);
        assert_eq!(saved.registration.email.as_deref(), Some("b@example.com"));
    }

    #[tokio::test]
    async fn test_payment_for_missing_registration_is_still_logged() {
        let store = MemoryStore::new();

        let recorded = store
            .record_payment(&NewPayment::default(), Some(&link("REG-404")))
            .await
            .unwrap();

        assert!(recorded.registration.is_none());
        assert_eq!(store.payments().await.len(), 1);
        assert!(store.registrations().await.is_empty());
    }
}
