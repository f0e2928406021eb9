use crate::{
    error::MedReminderError,
    shared::{
        reconcile::cancel_all,
        store::{MedicationStore, StoreError},
        usecase::{execute, UseCase},
    },
};
use medication_reminder_domain::ID;
use medication_reminder_infra::MedReminderContext;

fn handle_error(e: UseCaseErrors) -> MedReminderError {
    match e {
        UseCaseErrors::MedicationNotFound(medication_id) => MedReminderError::NotFound(format!(
            "The medication with id: {}, was not found.",
            medication_id
        )),
        UseCaseErrors::Store(e) => MedReminderError::from(e),
    }
}

pub async fn delete_medication(
    medication_id: ID,
    ctx: &MedReminderContext,
    store: &mut MedicationStore,
) -> Result<(), MedReminderError> {
    let usecase = DeleteMedicationUseCase { medication_id };

    execute(usecase, ctx, store).await.map_err(handle_error)
}

#[derive(Debug)]
struct DeleteMedicationUseCase {
    pub medication_id: ID,
}

#[derive(Debug)]
enum UseCaseErrors {
    MedicationNotFound(ID),
    Store(StoreError),
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteMedicationUseCase {
    type Response = ();

    type Errors = UseCaseErrors;

    async fn execute(
        &mut self,
        ctx: &MedReminderContext,
        store: &mut MedicationStore,
    ) -> Result<Self::Response, Self::Errors> {
        let notification_ids = match store.find(&self.medication_id) {
            Some(medication) => medication.notification_ids.clone(),
            None => return Err(UseCaseErrors::MedicationNotFound(self.medication_id)),
        };

        cancel_all(&notification_ids, ctx.notifications.as_ref()).await;

        store
            .delete(&self.medication_id)
            .await
            .map_err(UseCaseErrors::Store)
    }
}
