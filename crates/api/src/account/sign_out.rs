use crate::shared::{
    store::MedicationStore,
    usecase::{execute, UseCase},
};
use medication_reminder_infra::MedReminderContext;

pub async fn sign_out(ctx: &MedReminderContext, store: &mut MedicationStore) {
    // Signing out can not fail
    let _ = execute(SignOutUseCase {}, ctx, store).await;
}

#[derive(Debug)]
struct SignOutUseCase {}

#[async_trait::async_trait(?Send)]
impl UseCase for SignOutUseCase {
    type Response = ();

    type Errors = ();

    async fn execute(
        &mut self,
        ctx: &MedReminderContext,
        store: &mut MedicationStore,
    ) -> Result<Self::Response, Self::Errors> {
        ctx.identity.sign_out().await;
        store.clear();
        Ok(())
    }
}
