use super::store::MedicationStore;
use medication_reminder_infra::MedReminderContext;
use std::fmt::Debug;
use tracing::error;

#[async_trait::async_trait(?Send)]
pub trait UseCase: Debug {
    type Response;
    type Errors;

    async fn execute(
        &mut self,
        ctx: &MedReminderContext,
        store: &mut MedicationStore,
    ) -> Result<Self::Response, Self::Errors>;
}

#[tracing::instrument(name = "Executing usecase", skip(usecase, ctx, store))]
pub async fn execute<U>(
    mut usecase: U,
    ctx: &MedReminderContext,
    store: &mut MedicationStore,
) -> Result<U::Response, U::Errors>
where
    U: UseCase,
    U::Errors: Debug,
{
    let res = usecase.execute(ctx, store).await;

    if let Err(e) = &res {
        error!("Use case error: {:?}", e);
    }

    res
}
