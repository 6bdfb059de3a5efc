//! User repository over the document store.
//!
//! Profile documents live in the `users` collection keyed by uid. Membership
//! mutations go through the store's commutative set operations so writes from
//! different clients commute; the whole set is never rewritten.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::domain::auth::Identity;
use crate::domain::community::CommunityId;
use crate::domain::ports::{
    Document, DocumentStore, DocumentStoreError, MergePolicy, SetOp, UserRepository,
    UserRepositoryError,
};
use crate::domain::user::{UserId, UserProfile};

const USERS: &str = "users";
const COMMUNITIES_FIELD: &str = "communities";

/// [`UserRepository`] adapter backed by a [`DocumentStore`].
pub struct DocumentUserRepository<S> {
    store: Arc<S>,
}

impl<S> DocumentUserRepository<S> {
    /// Create a repository over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> DocumentUserRepository<S>
where
    S: DocumentStore,
{
    fn map_store_error(error: DocumentStoreError) -> UserRepositoryError {
        match error {
            DocumentStoreError::Unavailable { message } => {
                UserRepositoryError::unavailable(message)
            }
            DocumentStoreError::NotFound { id, .. } => UserRepositoryError::profile_missing(id),
            DocumentStoreError::Serialization { message } => UserRepositoryError::query(message),
        }
    }

    fn decode(document: Document) -> Result<UserProfile, UserRepositoryError> {
        serde_json::from_value(Value::Object(document.fields)).map_err(|err| {
            UserRepositoryError::query(format!(
                "profile document {id} is corrupt: {err}",
                id = document.id
            ))
        })
    }

    fn upsert_fields(identity: &Identity) -> Result<serde_json::Map<String, Value>, UserRepositoryError> {
        let mut fields = match serde_json::to_value(identity.attributes()) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                return Err(UserRepositoryError::query(
                    "profile attributes did not encode as an object",
                ));
            }
        };
        fields.insert("id".to_owned(), Value::String(identity.uid().to_string()));
        Ok(fields)
    }

    async fn stored_profile(&self, uid: &UserId) -> Result<UserProfile, UserRepositoryError> {
        let document = self
            .store
            .get(USERS, uid.as_ref())
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| UserRepositoryError::profile_missing(uid.as_ref()))?;
        Self::decode(document)
    }
}

#[async_trait]
impl<S> UserRepository for DocumentUserRepository<S>
where
    S: DocumentStore,
{
    async fn find_by_id(&self, uid: &UserId) -> Result<Option<UserProfile>, UserRepositoryError> {
        let document = self
            .store
            .get(USERS, uid.as_ref())
            .await
            .map_err(Self::map_store_error)?;
        document.map(Self::decode).transpose()
    }

    async fn merge_upsert(&self, identity: &Identity) -> Result<UserProfile, UserRepositoryError> {
        // A merge write refreshes the provider attributes while preserving
        // the membership set and any fields newer revisions may have added.
        let fields = Self::upsert_fields(identity)?;
        self.store
            .put(USERS, identity.uid().as_ref(), fields, MergePolicy::Merge)
            .await
            .map_err(Self::map_store_error)?;

        self.stored_profile(identity.uid()).await
    }

    async fn add_community(
        &self,
        uid: &UserId,
        community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, UserRepositoryError> {
        self.store
            .update_field(
                USERS,
                uid.as_ref(),
                COMMUNITIES_FIELD,
                SetOp::AddToSet,
                Value::String(community.to_string()),
            )
            .await
            .map_err(Self::map_store_error)?;

        Ok(self.stored_profile(uid).await?.communities().clone())
    }

    async fn remove_community(
        &self,
        uid: &UserId,
        community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, UserRepositoryError> {
        self.store
            .update_field(
                USERS,
                uid.as_ref(),
                COMMUNITIES_FIELD,
                SetOp::RemoveFromSet,
                Value::String(community.to_string()),
            )
            .await
            .map_err(Self::map_store_error)?;

        Ok(self.stored_profile(uid).await?.communities().clone())
    }

    async fn members_of(
        &self,
        community: &CommunityId,
    ) -> Result<Vec<UserId>, UserRepositoryError> {
        let documents = self
            .store
            .list_all(USERS)
            .await
            .map_err(Self::map_store_error)?;

        let mut members = Vec::new();
        for document in documents {
            let id = document.id.clone();
            match Self::decode(document) {
                Ok(profile) if profile.has_joined(community) => {
                    members.push(profile.id().clone());
                }
                Ok(_) => {}
                Err(error) => {
                    // A corrupt profile must not hide the rest of the roster.
                    warn!(document = %id, error = %error, "skipping undecodable profile");
                }
            }
        }
        Ok(members)
    }
}
