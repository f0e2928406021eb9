use medication_reminder_domain::{Medication, OwnerId, ID};
use medication_reminder_infra::{identity::IIdentityProvider, IMedicationRepo, RepoError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("The medication with id: {0}, was not found")]
    NotFound(ID),
    #[error("The user has no medications")]
    NoMedications,
    #[error("A medication with id: {0} already exists")]
    Conflict(ID),
    #[error("Malformed medication document. Error message: `{0}`")]
    BadData(String),
    #[error("No user is signed in")]
    Unauthenticated,
    #[error(transparent)]
    Storage(anyhow::Error),
}

impl StoreError {
    fn from_repo(e: RepoError, medication_id: &ID) -> Self {
        match e {
            RepoError::NotFound => Self::NotFound(*medication_id),
            RepoError::AlreadyExists => Self::Conflict(*medication_id),
            e => Self::from(e),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::BadData(msg) => Self::BadData(msg),
            RepoError::Unauthenticated => Self::Unauthenticated,
            RepoError::Storage(e) => Self::Storage(e),
            e => Self::Storage(anyhow::Error::new(e)),
        }
    }
}

/// The `Medication`s of the signed in user.
///
/// Every mutation goes to the remote store first and is only applied to the
/// in-memory list when it succeeded, so the list never holds anything the
/// remote store does not.
pub struct MedicationStore {
    repo: Arc<dyn IMedicationRepo>,
    identity: Arc<dyn IIdentityProvider>,
    medications: Vec<Medication>,
    /// Owner of the records currently in `medications`
    loaded_for: Option<OwnerId>,
}

impl MedicationStore {
    pub fn new(repo: Arc<dyn IMedicationRepo>, identity: Arc<dyn IIdentityProvider>) -> Self {
        Self {
            repo,
            identity,
            medications: Vec::new(),
            loaded_for: None,
        }
    }

    pub fn medications(&self) -> &[Medication] {
        &self.medications
    }

    pub fn find(&self, medication_id: &ID) -> Option<&Medication> {
        self.medications.iter().find(|m| m.id == *medication_id)
    }

    pub fn loaded_for(&self) -> Option<&OwnerId> {
        self.loaded_for.as_ref()
    }

    pub fn clear(&mut self) {
        self.medications.clear();
        self.loaded_for = None;
    }

    fn owner(&self) -> Result<OwnerId, StoreError> {
        self.identity
            .current_owner()
            .ok_or(StoreError::Unauthenticated)
    }

    /// Replaces the list with the remote records of the current owner.
    /// Without a signed in user the list is cleared.
    pub async fn fetch_all(&mut self) -> Result<&[Medication], StoreError> {
        let owner_id = match self.identity.current_owner() {
            Some(owner_id) => owner_id,
            None => {
                self.clear();
                return Ok(&self.medications);
            }
        };

        let medications = self.repo.find_by_owner(&owner_id).await?;
        info!(
            "Fetched {} medications of user {}",
            medications.len(),
            owner_id
        );
        self.medications = medications;
        self.loaded_for = Some(owner_id);
        Ok(&self.medications)
    }

    pub async fn create(&mut self, medication: Medication) -> Result<(), StoreError> {
        let owner_id = self.owner()?;
        if medication.owner_id != owner_id {
            return Err(StoreError::Unauthenticated);
        }

        self.repo
            .insert(&medication)
            .await
            .map_err(|e| StoreError::from_repo(e, &medication.id))?;
        self.medications.push(medication);
        Ok(())
    }

    pub async fn update(&mut self, medication: Medication) -> Result<(), StoreError> {
        let owner_id = self.owner()?;
        if medication.owner_id != owner_id {
            return Err(StoreError::NotFound(medication.id));
        }

        self.repo
            .save(&medication)
            .await
            .map_err(|e| StoreError::from_repo(e, &medication.id))?;
        match self.medications.iter_mut().find(|m| m.id == medication.id) {
            Some(existing) => *existing = medication,
            None => self.medications.push(medication),
        }
        Ok(())
    }

    /// Deletes a record of the current owner. Records of other owners are
    /// `NotFound` even when the remote store holds them.
    pub async fn delete(&mut self, medication_id: &ID) -> Result<(), StoreError> {
        let owner_id = self.owner()?;
        match self.find(medication_id) {
            Some(medication) if medication.owner_id == owner_id => (),
            _ => return Err(StoreError::NotFound(*medication_id)),
        }

        self.repo
            .delete(medication_id)
            .await
            .map_err(|e| StoreError::from_repo(e, medication_id))?;
        self.medications.retain(|m| m.id != *medication_id);
        Ok(())
    }

    /// Deletes every remote record of the current owner. Fails with
    /// `NoMedications` when the owner has no records.
    pub async fn delete_all(&mut self) -> Result<i64, StoreError> {
        let owner_id = self.owner()?;

        let res = self.repo.delete_by_owner(&owner_id).await.map_err(|e| match e {
            RepoError::NotFound => StoreError::NoMedications,
            e => StoreError::from(e),
        })?;
        info!(
            "Deleted {} medications of user {}",
            res.deleted_count, owner_id
        );
        self.medications.clear();
        Ok(res.deleted_count)
    }
}
