use crate::shared::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum MedReminderError {
    #[error("404 Not found. Error message: `{0}`")]
    NotFound(String),
    #[error("Invalid data provided: Error message: `{0}`")]
    BadData(String),
    #[error("No user is signed in. Error message: `{0}`")]
    Unauthenticated(String),
    #[error("Unable to schedule notifications. Error message: `{0}`")]
    SchedulerRegistrationFailed(String),
    #[error("Invalid schedule input: Error message: `{0}`")]
    InvalidScheduleInput(String),
    #[error("There was a conflict with the request. Error message: `{0}`")]
    Conflict(String),
    #[error("Invalid credentials. Error message: `{0}`")]
    InvalidCredentials(String),
    #[error("Storage error")]
    StorageError,
}

impl From<StoreError> for MedReminderError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(medication_id) => Self::NotFound(format!(
                "The medication with id: {}, was not found.",
                medication_id
            )),
            StoreError::NoMedications => {
                Self::NotFound("The user does not have any medications.".into())
            }
            StoreError::Conflict(medication_id) => Self::Conflict(format!(
                "A medication with id: {} already exists.",
                medication_id
            )),
            StoreError::BadData(msg) => Self::BadData(msg),
            StoreError::Unauthenticated => {
                Self::Unauthenticated("Sign in to access medications.".into())
            }
            StoreError::Storage(_) => Self::StorageError,
        }
    }
}
