use crate::{
    error::MedReminderError,
    medication::{DeleteAllMedicationsErrors, DeleteAllMedicationsUseCase},
    shared::{
        reconcile::cancel_all,
        store::{MedicationStore, StoreError},
        usecase::{execute, UseCase},
    },
};
use medication_reminder_infra::{identity::IdentityError, MedReminderContext};
use tracing::info;

fn handle_error(e: UseCaseErrors) -> MedReminderError {
    match e {
        UseCaseErrors::Unauthenticated => {
            MedReminderError::Unauthenticated("Sign in to delete the account.".into())
        }
        UseCaseErrors::Store(e) => MedReminderError::from(e),
        UseCaseErrors::IdentityProviderError => MedReminderError::StorageError,
    }
}

/// Cancels every notification, deletes all medications of the signed in user
/// and finally the account itself.
pub async fn delete_account(
    ctx: &MedReminderContext,
    store: &mut MedicationStore,
) -> Result<(), MedReminderError> {
    execute(DeleteAccountUseCase {}, ctx, store)
        .await
        .map_err(handle_error)
}

#[derive(Debug)]
struct DeleteAccountUseCase {}

#[derive(Debug)]
enum UseCaseErrors {
    Unauthenticated,
    Store(StoreError),
    IdentityProviderError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteAccountUseCase {
    type Response = ();

    type Errors = UseCaseErrors;

    async fn execute(
        &mut self,
        ctx: &MedReminderContext,
        store: &mut MedicationStore,
    ) -> Result<Self::Response, Self::Errors> {
        let owner_id = ctx
            .identity
            .current_owner()
            .ok_or(UseCaseErrors::Unauthenticated)?;

        let notifications = ctx.notifications.as_ref();
        cancel_all(&notifications.scheduled().await, notifications).await;

        let mut delete_medications = DeleteAllMedicationsUseCase {};
        match delete_medications.execute(ctx, store).await {
            Ok(_) | Err(DeleteAllMedicationsErrors::Store(StoreError::NoMedications)) => (),
            Err(DeleteAllMedicationsErrors::Unauthenticated) => {
                return Err(UseCaseErrors::Unauthenticated)
            }
            Err(DeleteAllMedicationsErrors::Store(e)) => return Err(UseCaseErrors::Store(e)),
        }

        match ctx.identity.delete_account().await {
            Ok(()) => {
                info!("Deleted the account of user {}", owner_id);
                store.clear();
                Ok(())
            }
            Err(IdentityError::Unauthenticated) => Err(UseCaseErrors::Unauthenticated),
            Err(_) => Err(UseCaseErrors::IdentityProviderError),
        }
    }
}
