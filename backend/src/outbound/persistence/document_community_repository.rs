//! Community repository over the document store.
//!
//! Community documents live in the `communities` collection. Keys are minted
//! here, at the store boundary, as UUID v4 strings.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::domain::community::{Community, CommunityDraft, CommunityId};
use crate::domain::ports::{
    CommunityRepository, CommunityRepositoryError, Document, DocumentStore, DocumentStoreError,
    MergePolicy,
};
use crate::domain::user::UserId;

const COMMUNITIES: &str = "communities";

/// [`CommunityRepository`] adapter backed by a [`DocumentStore`].
pub struct DocumentCommunityRepository<S> {
    store: Arc<S>,
}

impl<S> DocumentCommunityRepository<S> {
    /// Create a repository over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> DocumentCommunityRepository<S>
where
    S: DocumentStore,
{
    fn map_store_error(error: DocumentStoreError) -> CommunityRepositoryError {
        match error {
            DocumentStoreError::Unavailable { message } => {
                CommunityRepositoryError::unavailable(message)
            }
            DocumentStoreError::NotFound { collection, id } => {
                CommunityRepositoryError::query(format!("document {collection}/{id} vanished"))
            }
            DocumentStoreError::Serialization { message } => {
                CommunityRepositoryError::query(message)
            }
        }
    }

    fn decode(document: Document) -> Result<Community, CommunityRepositoryError> {
        serde_json::from_value(Value::Object(document.fields)).map_err(|err| {
            CommunityRepositoryError::query(format!(
                "community document {id} is corrupt: {err}",
                id = document.id
            ))
        })
    }

    fn encode(community: &Community) -> Result<serde_json::Map<String, Value>, CommunityRepositoryError> {
        match serde_json::to_value(community) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => Err(CommunityRepositoryError::query(
                "community did not encode as an object",
            )),
        }
    }
}

#[async_trait]
impl<S> CommunityRepository for DocumentCommunityRepository<S>
where
    S: DocumentStore,
{
    async fn create(
        &self,
        creator: &UserId,
        draft: CommunityDraft,
    ) -> Result<Community, CommunityRepositoryError> {
        let id = CommunityId::new(Uuid::new_v4().to_string())
            .map_err(|err| CommunityRepositoryError::query(format!("minted id invalid: {err}")))?;
        let community = Community::from_draft(id, draft, creator.clone(), Utc::now());

        let fields = Self::encode(&community)?;
        self.store
            .put(
                COMMUNITIES,
                community.id().as_ref(),
                fields,
                MergePolicy::Overwrite,
            )
            .await
            .map_err(Self::map_store_error)?;
        Ok(community)
    }

    async fn list(&self) -> Result<Vec<Community>, CommunityRepositoryError> {
        let documents = self
            .store
            .list_all(COMMUNITIES)
            .await
            .map_err(Self::map_store_error)?;

        let mut communities = Vec::with_capacity(documents.len());
        for document in documents {
            let id = document.id.clone();
            match Self::decode(document) {
                Ok(community) => communities.push(community),
                Err(error) => {
                    // One corrupt document must not empty the whole listing.
                    warn!(document = %id, error = %error, "skipping undecodable community");
                }
            }
        }
        Ok(communities)
    }

    async fn find_by_id(
        &self,
        id: &CommunityId,
    ) -> Result<Option<Community>, CommunityRepositoryError> {
        let document = self
            .store
            .get(COMMUNITIES, id.as_ref())
            .await
            .map_err(Self::map_store_error)?;
        document.map(Self::decode).transpose()
    }

    async fn delete(&self, id: &CommunityId) -> Result<(), CommunityRepositoryError> {
        self.store
            .delete(COMMUNITIES, id.as_ref())
            .await
            .map_err(Self::map_store_error)
    }
}
