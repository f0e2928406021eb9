use crate::{
    error::MedReminderError,
    shared::{
        reconcile::{cancel_all, reconcile, ReconcileError},
        store::{MedicationStore, StoreError},
        usecase::{execute, UseCase},
    },
};
use medication_reminder_domain::{ScheduleError, ID};
use medication_reminder_infra::MedReminderContext;
use std::collections::HashSet;
use tracing::info;

fn handle_error(e: UseCaseErrors) -> MedReminderError {
    match e {
        UseCaseErrors::InvalidSchedule(medication_id, e) => MedReminderError::BadData(format!(
            "The medication with id: {} has an invalid schedule. Error message: {}",
            medication_id, e
        )),
        UseCaseErrors::RegistrationFailed(e) => {
            MedReminderError::SchedulerRegistrationFailed(e.to_string())
        }
        UseCaseErrors::Store(e) => MedReminderError::from(e),
    }
}

/// Schedules the notifications again for every loaded medication whose
/// notifications are not all live in the scheduler, e.g. after a restart.
/// Returns the ids of the restored medications.
pub async fn restore_reminders(
    ctx: &MedReminderContext,
    store: &mut MedicationStore,
) -> Result<Vec<ID>, MedReminderError> {
    execute(RestoreRemindersUseCase {}, ctx, store)
        .await
        .map(|res| res.restored)
        .map_err(handle_error)
}

#[derive(Debug)]
struct RestoreRemindersUseCase {}

#[derive(Debug)]
enum UseCaseErrors {
    InvalidSchedule(ID, ScheduleError),
    RegistrationFailed(ReconcileError),
    Store(StoreError),
}

struct UseCaseRes {
    pub restored: Vec<ID>,
}

#[async_trait::async_trait(?Send)]
impl UseCase for RestoreRemindersUseCase {
    type Response = UseCaseRes;

    type Errors = UseCaseErrors;

    async fn execute(
        &mut self,
        ctx: &MedReminderContext,
        store: &mut MedicationStore,
    ) -> Result<Self::Response, Self::Errors> {
        let notifications = ctx.notifications.as_ref();
        let live = notifications.scheduled().await.into_iter().collect::<HashSet<_>>();

        let stale = store
            .medications()
            .iter()
            .filter(|medication| {
                medication.triggers().map(|triggers| triggers.len())
                    != Ok(medication.notification_ids.len())
                    || medication.notification_ids.iter().any(|id| !live.contains(id))
            })
            .cloned()
            .collect::<Vec<_>>();

        let mut restored = Vec::with_capacity(stale.len());
        for mut medication in stale {
            let triggers = medication
                .triggers()
                .map_err(|e| UseCaseErrors::InvalidSchedule(medication.id, e))?;
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
                    return Err(UseCaseErrors::RegistrationFailed(e));
                }
            };

            if let Err(e) = store.update(medication.clone()).await {
                cancel_all(&medication.notification_ids, notifications).await;
                return Err(UseCaseErrors::Store(e));
            }
            info!(
                "Restored {} notifications of medication {}",
                medication.notification_ids.len(),
                medication.id
            );
            restored.push(medication.id);
        }

        Ok(UseCaseRes { restored })
    }
}
