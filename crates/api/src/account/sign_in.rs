use crate::{
    error::MedReminderError,
    shared::{
        store::MedicationStore,
        usecase::{execute, UseCase},
    },
};
use medication_reminder_infra::{
    identity::{IdentityError, Session},
    MedReminderContext,
};

fn handle_error(e: UseCaseErrors) -> MedReminderError {
    match e {
        UseCaseErrors::InvalidCredentials(msg) => MedReminderError::InvalidCredentials(msg),
        UseCaseErrors::IdentityProviderError => MedReminderError::StorageError,
    }
}

pub async fn sign_in(
    email: String,
    password: String,
    ctx: &MedReminderContext,
    store: &mut MedicationStore,
) -> Result<Session, MedReminderError> {
    let usecase = SignInUseCase { email, password };

    execute(usecase, ctx, store)
        .await
        .map(|res| res.session)
        .map_err(handle_error)
}

#[derive(Debug)]
struct SignInUseCase {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
enum UseCaseErrors {
    InvalidCredentials(String),
    IdentityProviderError,
}

struct UseCaseRes {
    pub session: Session,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SignInUseCase {
    type Response = UseCaseRes;

    type Errors = UseCaseErrors;

    async fn execute(
        &mut self,
        ctx: &MedReminderContext,
        _store: &mut MedicationStore,
    ) -> Result<Self::Response, Self::Errors> {
        match ctx.identity.sign_in(&self.email, &self.password).await {
            Ok(session) => Ok(UseCaseRes { session }),
            Err(IdentityError::InvalidCredentials(msg)) => {
                Err(UseCaseErrors::InvalidCredentials(msg))
            }
            Err(_) => Err(UseCaseErrors::IdentityProviderError),
        }
    }
}
