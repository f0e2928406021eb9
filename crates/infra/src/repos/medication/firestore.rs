use super::IMedicationRepo;
use crate::{
    repos::{
        shared::firestore::{from_document, to_document, RunQueryResponseItem},
        DeleteResult, RepoError,
    },
    services::identity::{IIdentityProvider, IdentityError},
};
use futures::future::try_join_all;
use medication_reminder_domain::{Medication, OwnerId, ID};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use url::Url;

const FIRESTORE_API_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// `Medication` documents stored in a Cloud Firestore collection through the REST api.
/// Requests are authorized with the id token of the signed in user.
pub struct FirestoreMedicationRepo {
    client: Client,
    documents_url: String,
    collection: String,
    identity: Arc<dyn IIdentityProvider>,
}

impl FirestoreMedicationRepo {
    pub fn new(project_id: &str, collection: &str, identity: Arc<dyn IIdentityProvider>) -> Self {
        Self {
            client: Client::new(),
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                FIRESTORE_API_BASE_URL, project_id
            ),
            collection: collection.to_string(),
            identity,
        }
    }

    fn collection_url(&self, params: &[(&str, &str)]) -> Result<Url, RepoError> {
        parse_url(&format!("{}/{}", self.documents_url, self.collection), params)
    }

    fn document_url(&self, medication_id: &ID, params: &[(&str, &str)]) -> Result<Url, RepoError> {
        parse_url(
            &format!("{}/{}/{}", self.documents_url, self.collection, medication_id),
            params,
        )
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response, RepoError> {
        let id_token = self.identity.id_token().await.map_err(|e| match e {
            IdentityError::Unauthenticated => RepoError::Unauthenticated,
            e => RepoError::Storage(anyhow::Error::new(e)),
        })?;

        let res = request.bearer_auth(id_token).send().await.map_err(|e| {
            error!(
                "[Network Error] Firestore API {} error. Error message: {:?}",
                operation, e
            );
            anyhow::Error::new(e)
        })?;

        match res.status() {
            status if status.is_success() => Ok(res),
            StatusCode::NOT_FOUND => Err(RepoError::NotFound),
            StatusCode::CONFLICT => Err(RepoError::AlreadyExists),
            StatusCode::UNAUTHORIZED => Err(RepoError::Unauthenticated),
            status => {
                let body = res.text().await.unwrap_or_default();
                error!(
                    "[Unexpected Response] Firestore API {} error. Status: {}, body: {}",
                    operation, status, body
                );
                Err(RepoError::Storage(anyhow::anyhow!(
                    "Firestore responded with status {}",
                    status
                )))
            }
        }
    }

    async fn query_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Medication>, RepoError> {
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "userId" },
                        "op": "EQUAL",
                        "value": { "stringValue": owner_id.as_str() }
                    }
                }
            }
        });
        let url = parse_url(&format!("{}:runQuery", self.documents_url), &[])?;
        let res = self
            .send(self.client.post(url).json(&query), "runQuery")
            .await?;

        let items = res
            .json::<Vec<RunQueryResponseItem>>()
            .await
            .map_err(|e| RepoError::BadData(e.to_string()))?;

        // Items without a document only carry the read time
        items
            .iter()
            .filter_map(|item| item.document.as_ref())
            .map(|doc| from_document::<Medication>(doc).map_err(RepoError::BadData))
            .collect()
    }
}

fn parse_url(url: &str, params: &[(&str, &str)]) -> Result<Url, RepoError> {
    Url::parse_with_params(url, params).map_err(|e| RepoError::Storage(anyhow::Error::new(e)))
}

#[async_trait::async_trait]
impl IMedicationRepo for FirestoreMedicationRepo {
    async fn insert(&self, medication: &Medication) -> Result<(), RepoError> {
        let doc = to_document(medication).map_err(RepoError::BadData)?;
        let medication_id = medication.id.as_string();
        let url = self.collection_url(&[("documentId", medication_id.as_str())])?;
        self.send(self.client.post(url).json(&doc), "POST").await?;
        Ok(())
    }

    async fn save(&self, medication: &Medication) -> Result<(), RepoError> {
        let doc = to_document(medication).map_err(RepoError::BadData)?;
        let url = self.document_url(&medication.id, &[("currentDocument.exists", "true")])?;
        self.send(self.client.patch(url).json(&doc), "PATCH").await?;
        Ok(())
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Medication>, RepoError> {
        self.query_by_owner(owner_id).await
    }

    async fn delete(&self, medication_id: &ID) -> Result<(), RepoError> {
        let url = self.document_url(medication_id, &[("currentDocument.exists", "true")])?;
        self.send(self.client.delete(url), "DELETE").await?;
        Ok(())
    }

    async fn delete_by_owner(&self, owner_id: &OwnerId) -> Result<DeleteResult, RepoError> {
        let medications = self.query_by_owner(owner_id).await?;
        if medications.is_empty() {
            return Err(RepoError::NotFound);
        }

        try_join_all(medications.iter().map(|m| self.delete(&m.id))).await?;
        Ok(DeleteResult {
            deleted_count: medications.len() as i64,
        })
    }
}
