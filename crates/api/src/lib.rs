mod account;
mod error;
mod medication;
mod shared;

pub use error::MedReminderError;
use medication_reminder_domain::{Medication, MedicationDetails, ID};
use medication_reminder_infra::{identity::Session, MedReminderContext};
pub use shared::{
    reconcile::{reconcile, ReconcileError},
    store::{MedicationStore, StoreError},
};
use tokio::sync::watch;
use tracing::info;

/// The medication reminder application of one signed in user.
///
/// Keeps the loaded `Medication`s in sync with the identity session: they are
/// cleared when the user signs out and fetched again when a user signs in.
pub struct Application {
    context: MedReminderContext,
    store: MedicationStore,
    auth_state: watch::Receiver<Option<Session>>,
}

impl Application {
    pub fn new(context: MedReminderContext) -> Self {
        let store = MedicationStore::new(
            context.repos.medications.clone(),
            context.identity.clone(),
        );
        let auth_state = context.identity.subscribe();
        Self {
            context,
            store,
            auth_state,
        }
    }

    pub fn context(&self) -> &MedReminderContext {
        &self.context
    }

    pub fn medications(&self) -> &[Medication] {
        self.store.medications()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.context.identity.current_session()
    }

    /// Waits for the next authentication state change and applies it
    pub async fn auth_state_changed(&mut self) -> Result<(), MedReminderError> {
        if self.auth_state.changed().await.is_err() {
            // The identity provider is gone, nothing will change anymore
            futures::future::pending::<()>().await;
        }
        self.apply_auth_state().await
    }

    async fn sync_auth_state(&mut self) -> Result<(), MedReminderError> {
        match self.auth_state.has_changed() {
            Ok(true) => self.apply_auth_state().await,
            _ => Ok(()),
        }
    }

    async fn apply_auth_state(&mut self) -> Result<(), MedReminderError> {
        let session = self.auth_state.borrow_and_update().clone();
        match session {
            None => {
                if self.store.loaded_for().is_some() {
                    info!("User signed out, clearing medications");
                }
                self.store.clear();
                Ok(())
            }
            Some(session) if self.store.loaded_for() != Some(&session.owner_id) => {
                info!("User {} signed in, fetching medications", session.owner_id);
                medication::fetch_medications(&self.context, &mut self.store)
                    .await
                    .map(|_| ())
            }
            Some(_) => Ok(()),
        }
    }

    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Session, MedReminderError> {
        let session = account::sign_up(
            email.to_string(),
            password.to_string(),
            &self.context,
            &mut self.store,
        )
        .await?;
        self.sync_auth_state().await?;
        Ok(session)
    }

    pub async fn sign_in(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Session, MedReminderError> {
        let session = account::sign_in(
            email.to_string(),
            password.to_string(),
            &self.context,
            &mut self.store,
        )
        .await?;
        self.sync_auth_state().await?;
        Ok(session)
    }

    pub async fn sign_out(&mut self) {
        account::sign_out(&self.context, &mut self.store).await;
        // Sign out always clears, so applying the state can not fail
        let _ = self.sync_auth_state().await;
    }

    pub async fn delete_account(&mut self) -> Result<(), MedReminderError> {
        self.sync_auth_state().await?;
        account::delete_account(&self.context, &mut self.store).await?;
        self.sync_auth_state().await
    }

    pub async fn fetch_medications(&mut self) -> Result<Vec<Medication>, MedReminderError> {
        // Fetching below applies whatever the session is now
        let _ = self.auth_state.borrow_and_update();
        medication::fetch_medications(&self.context, &mut self.store).await
    }

    pub async fn add_medication(
        &mut self,
        details: MedicationDetails,
    ) -> Result<Medication, MedReminderError> {
        self.sync_auth_state().await?;
        medication::add_medication(details, &self.context, &mut self.store).await
    }

    pub async fn update_medication(
        &mut self,
        medication_id: ID,
        details: MedicationDetails,
    ) -> Result<Medication, MedReminderError> {
        self.sync_auth_state().await?;
        medication::update_medication(medication_id, details, &self.context, &mut self.store).await
    }

    pub async fn delete_medication(&mut self, medication_id: ID) -> Result<(), MedReminderError> {
        self.sync_auth_state().await?;
        medication::delete_medication(medication_id, &self.context, &mut self.store).await
    }

    pub async fn delete_all_medications(&mut self) -> Result<i64, MedReminderError> {
        self.sync_auth_state().await?;
        medication::delete_all_medications(&self.context, &mut self.store).await
    }

    /// Schedules the notifications of loaded medications again when they are
    /// not live in the notification scheduler. Returns the restored ids.
    pub async fn restore_reminders(&mut self) -> Result<Vec<ID>, MedReminderError> {
        self.sync_auth_state().await?;
        medication::restore_reminders(&self.context, &mut self.store).await
    }
}
