mod firestore;
mod inmemory;

use super::{DeleteResult, RepoError};
pub use firestore::FirestoreMedicationRepo;
pub use inmemory::InMemoryMedicationRepo;
use medication_reminder_domain::{Medication, OwnerId, ID};

/// The remote collection of `Medication` documents, keyed by `Medication::id`
#[async_trait::async_trait]
pub trait IMedicationRepo: Send + Sync {
    /// Fails with `AlreadyExists` if a document with the same id is stored
    async fn insert(&self, medication: &Medication) -> Result<(), RepoError>;
    /// Replaces the whole document, fails with `NotFound` if it does not exist
    async fn save(&self, medication: &Medication) -> Result<(), RepoError>;
    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Medication>, RepoError>;
    async fn delete(&self, medication_id: &ID) -> Result<(), RepoError>;
    /// Fails with `NotFound` if the owner has no documents
    async fn delete_by_owner(&self, owner_id: &OwnerId) -> Result<DeleteResult, RepoError>;
}
