use crate::{
    error::MedReminderError,
    shared::{
        store::{MedicationStore, StoreError},
        usecase::{execute, UseCase},
    },
};
use medication_reminder_domain::Medication;
use medication_reminder_infra::MedReminderContext;

fn handle_error(e: UseCaseErrors) -> MedReminderError {
    match e {
        UseCaseErrors::Store(e) => MedReminderError::from(e),
    }
}

pub async fn fetch_medications(
    ctx: &MedReminderContext,
    store: &mut MedicationStore,
) -> Result<Vec<Medication>, MedReminderError> {
    execute(FetchMedicationsUseCase {}, ctx, store)
        .await
        .map(|res| res.medications)
        .map_err(handle_error)
}

#[derive(Debug)]
struct FetchMedicationsUseCase {}

#[derive(Debug)]
enum UseCaseErrors {
    Store(StoreError),
}

struct UseCaseRes {
    pub medications: Vec<Medication>,
}

#[async_trait::async_trait(?Send)]
impl UseCase for FetchMedicationsUseCase {
    type Response = UseCaseRes;

    type Errors = UseCaseErrors;

    async fn execute(
        &mut self,
        _ctx: &MedReminderContext,
        store: &mut MedicationStore,
    ) -> Result<Self::Response, Self::Errors> {
        let medications = store.fetch_all().await.map_err(UseCaseErrors::Store)?;
        Ok(UseCaseRes {
            medications: medications.to_vec(),
        })
    }
}
