use crate::{
    error::MedReminderError,
    shared::{
        reconcile::cancel_all,
        store::{MedicationStore, StoreError},
        usecase::{execute, UseCase},
    },
};
use futures::future::join_all;
use medication_reminder_infra::MedReminderContext;

fn handle_error(e: UseCaseErrors) -> MedReminderError {
    match e {
        UseCaseErrors::Unauthenticated => {
            MedReminderError::Unauthenticated("Sign in to delete medications.".into())
        }
        UseCaseErrors::Store(e) => MedReminderError::from(e),
    }
}

pub async fn delete_all_medications(
    ctx: &MedReminderContext,
    store: &mut MedicationStore,
) -> Result<i64, MedReminderError> {
    execute(DeleteAllMedicationsUseCase {}, ctx, store)
        .await
        .map(|res| res.deleted_count)
        .map_err(handle_error)
}

#[derive(Debug)]
pub(crate) struct DeleteAllMedicationsUseCase {}

#[derive(Debug)]
pub(crate) enum UseCaseErrors {
    Unauthenticated,
    Store(StoreError),
}

pub(crate) struct UseCaseRes {
    pub deleted_count: i64,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteAllMedicationsUseCase {
    type Response = UseCaseRes;

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
        if store.loaded_for() != Some(&owner_id) {
            store.fetch_all().await.map_err(UseCaseErrors::Store)?;
        }

        let notifications = ctx.notifications.as_ref();
        join_all(
            store
                .medications()
                .iter()
                .map(|medication| cancel_all(&medication.notification_ids, notifications)),
        )
        .await;

        let deleted_count = store.delete_all().await.map_err(UseCaseErrors::Store)?;
        Ok(UseCaseRes { deleted_count })
    }
}
