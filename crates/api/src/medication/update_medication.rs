use crate::{
    error::MedReminderError,
    shared::{
        reconcile::{cancel_all, reconcile, ReconcileError},
        store::{MedicationStore, StoreError},
        usecase::{execute, UseCase},
    },
};
use medication_reminder_domain::{Medication, MedicationDetails, ScheduleError, ID};
use medication_reminder_infra::MedReminderContext;
use tracing::{error, info};

fn handle_error(e: UseCaseErrors) -> MedReminderError {
    match e {
        UseCaseErrors::MedicationNotFound(medication_id) => MedReminderError::NotFound(format!(
            "The medication with id: {}, was not found.",
            medication_id
        )),
        UseCaseErrors::InvalidSchedule(e) => MedReminderError::InvalidScheduleInput(e.to_string()),
        UseCaseErrors::RegistrationFailed(e) => {
            MedReminderError::SchedulerRegistrationFailed(e.to_string())
        }
        UseCaseErrors::Store(e) => MedReminderError::from(e),
    }
}

pub async fn update_medication(
    medication_id: ID,
    details: MedicationDetails,
    ctx: &MedReminderContext,
    store: &mut MedicationStore,
) -> Result<Medication, MedReminderError> {
    let usecase = UpdateMedicationUseCase {
        medication_id,
        details,
    };

    execute(usecase, ctx, store)
        .await
        .map(|res| res.medication)
        .map_err(handle_error)
}

#[derive(Debug)]
struct UpdateMedicationUseCase {
    pub medication_id: ID,
    pub details: MedicationDetails,
}

#[derive(Debug)]
enum UseCaseErrors {
    MedicationNotFound(ID),
    InvalidSchedule(ScheduleError),
    RegistrationFailed(ReconcileError),
    Store(StoreError),
}

struct UseCaseRes {
    pub medication: Medication,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateMedicationUseCase {
    type Response = UseCaseRes;

    type Errors = UseCaseErrors;

    async fn execute(
        &mut self,
        ctx: &MedReminderContext,
        store: &mut MedicationStore,
    ) -> Result<Self::Response, Self::Errors> {
        let previous = match store.find(&self.medication_id) {
            Some(medication) => medication.clone(),
            None => return Err(UseCaseErrors::MedicationNotFound(self.medication_id)),
        };
        let mut medication = previous.clone();

        let reschedule = medication
            .apply(self.details.clone())
            .map_err(UseCaseErrors::InvalidSchedule)?;

        let notifications = ctx.notifications.as_ref();
        if reschedule {
            let triggers = medication
                .triggers()
                .map_err(UseCaseErrors::InvalidSchedule)?;
            info!(
                "Schedule of medication {} changed, replacing {} notifications with {}",
                medication.id,
                medication.notification_ids.len(),
                triggers.len()
            );
            medication.notification_ids = match reconcile(
                &medication.notification_ids,
                triggers,
                &medication.notification_content(),
                notifications,
            )
            .await
            {
                Ok(ids) => ids,
                Err(e) => {
                    let ReconcileError::RegistrationFailed { registered, .. } = &e;
                    cancel_all(registered, notifications).await;
                    // The previous notifications are cancelled as well, so the
                    // record must not keep pointing at them
                    let mut unscheduled = previous;
                    unscheduled.notification_ids.clear();
                    if let Err(store_err) = store.update(unscheduled).await {
                        error!(
                            "Unable to clear the notifications of medication {}. Error: {:?}",
                            self.medication_id, store_err
                        );
                    }
                    return Err(UseCaseErrors::RegistrationFailed(e));
                }
            };
        }

        if let Err(e) = store.update(medication.clone()).await {
            if reschedule {
                // Leaves the record with ids that are not live, which restoring repairs
                cancel_all(&medication.notification_ids, notifications).await;
            }
            return Err(UseCaseErrors::Store(e));
        }

        Ok(UseCaseRes { medication })
    }
}
