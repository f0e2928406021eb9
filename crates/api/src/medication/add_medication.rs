use crate::{
    error::MedReminderError,
    shared::{
        reconcile::{cancel_all, reconcile, ReconcileError},
        store::{MedicationStore, StoreError},
        usecase::{execute, UseCase},
    },
};
use medication_reminder_domain::{Medication, MedicationDetails, ScheduleError};
use medication_reminder_infra::MedReminderContext;

fn handle_error(e: UseCaseErrors) -> MedReminderError {
    match e {
        UseCaseErrors::Unauthenticated => {
            MedReminderError::Unauthenticated("Sign in to add medications.".into())
        }
        UseCaseErrors::InvalidSchedule(e) => MedReminderError::InvalidScheduleInput(e.to_string()),
        UseCaseErrors::RegistrationFailed(e) => {
            MedReminderError::SchedulerRegistrationFailed(e.to_string())
        }
        UseCaseErrors::Store(e) => MedReminderError::from(e),
    }
}

pub async fn add_medication(
    details: MedicationDetails,
    ctx: &MedReminderContext,
    store: &mut MedicationStore,
) -> Result<Medication, MedReminderError> {
    let usecase = AddMedicationUseCase { details };

    execute(usecase, ctx, store)
        .await
        .map(|res| res.medication)
        .map_err(handle_error)
}

#[derive(Debug)]
struct AddMedicationUseCase {
    pub details: MedicationDetails,
}

#[derive(Debug)]
enum UseCaseErrors {
    Unauthenticated,
    InvalidSchedule(ScheduleError),
    RegistrationFailed(ReconcileError),
    Store(StoreError),
}

struct UseCaseRes {
    pub medication: Medication,
}

#[async_trait::async_trait(?Send)]
impl UseCase for AddMedicationUseCase {
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

        let mut medication = Medication::new(owner_id, self.details.clone())
            .map_err(UseCaseErrors::InvalidSchedule)?;
        let triggers = medication
            .triggers()
            .map_err(UseCaseErrors::InvalidSchedule)?;

        let notifications = ctx.notifications.as_ref();
        medication.notification_ids =
            match reconcile(&[], triggers, &medication.notification_content(), notifications)
                .await
            {
                Ok(ids) => ids,
                Err(e) => {
                    let ReconcileError::RegistrationFailed { registered, .. } = &e;
                    cancel_all(registered, notifications).await;
                    return Err(UseCaseErrors::RegistrationFailed(e));
                }
            };

        if let Err(e) = store.create(medication.clone()).await {
            cancel_all(&medication.notification_ids, notifications).await;
            return Err(UseCaseErrors::Store(e));
        }

        Ok(UseCaseRes { medication })
    }
}
