use super::IMedicationRepo;
use crate::repos::{shared::inmemory_repo::*, DeleteResult, RepoError};
use medication_reminder_domain::{Medication, OwnerId, ID};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct InMemoryMedicationRepo {
    medications: std::sync::Mutex<Vec<Medication>>,
    unavailable: AtomicBool,
}

impl InMemoryMedicationRepo {
    pub fn new() -> Self {
        Self {
            medications: std::sync::Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulates losing the connection to the document store
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepoError::Storage(anyhow::anyhow!(
                "The document store is unavailable"
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryMedicationRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IMedicationRepo for InMemoryMedicationRepo {
    async fn insert(&self, medication: &Medication) -> Result<(), RepoError> {
        self.check_available()?;
        insert(medication, &self.medications)
    }

    async fn save(&self, medication: &Medication) -> Result<(), RepoError> {
        self.check_available()?;
        if save(medication, &self.medications) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Medication>, RepoError> {
        self.check_available()?;
        Ok(find_by(&self.medications, |m| m.owner_id == *owner_id))
    }

    async fn delete(&self, medication_id: &ID) -> Result<(), RepoError> {
        self.check_available()?;
        delete(medication_id, &self.medications)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn delete_by_owner(&self, owner_id: &OwnerId) -> Result<DeleteResult, RepoError> {
        self.check_available()?;
        let res = delete_by(&self.medications, |m| m.owner_id == *owner_id);
        if res.deleted_count == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(res)
    }
}
