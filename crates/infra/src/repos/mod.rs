mod medication;
mod shared;

use crate::{config::FirebaseConfig, services::identity::IIdentityProvider};
pub use medication::{FirestoreMedicationRepo, IMedicationRepo, InMemoryMedicationRepo};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteResult {
    pub deleted_count: i64,
}

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("No matching document was found")]
    NotFound,
    #[error("A document with the same id already exists")]
    AlreadyExists,
    #[error("Malformed document. Error message: `{0}`")]
    BadData(String),
    #[error("The document store requires a signed in user")]
    Unauthenticated,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct Repos {
    pub medications: Arc<dyn IMedicationRepo>,
}

impl Repos {
    pub fn create_firestore(
        config: &FirebaseConfig,
        collection: &str,
        identity: Arc<dyn IIdentityProvider>,
    ) -> Self {
        Self {
            medications: Arc::new(FirestoreMedicationRepo::new(
                &config.project_id,
                collection,
                identity,
            )),
        }
    }

    pub fn create_inmemory() -> Self {
        Self {
            medications: Arc::new(InMemoryMedicationRepo::new()),
        }
    }
}
