//! Port for community document persistence.

use async_trait::async_trait;

use crate::domain::community::{Community, CommunityDraft, CommunityId};
use crate::domain::user::UserId;

/// Errors raised by community repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommunityRepositoryError {
    /// The backing store could not be reached.
    #[error("community repository unavailable: {message}")]
    Unavailable {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("community repository query failed: {message}")]
    Query {
        /// Adapter-supplied diagnostic.
        message: String,
    },
}

impl CommunityRepositoryError {
    /// Build a [`CommunityRepositoryError::Unavailable`] error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Build a [`CommunityRepositoryError::Query`] error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for community CRUD.
///
/// Identifier minting happens behind this port (the store generates document
/// keys), which is why `create` takes a draft and returns the stored
/// aggregate. Authorisation is not this port's concern; the service layer
/// enforces creator-only deletion before calling `delete`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityRepository: Send + Sync {
    /// Insert a new community document and return it with its minted id.
    async fn create(
        &self,
        creator: &UserId,
        draft: CommunityDraft,
    ) -> Result<Community, CommunityRepositoryError>;

    /// Full snapshot of every community, in storage order.
    async fn list(&self) -> Result<Vec<Community>, CommunityRepositoryError>;

    /// Fetch one community by id.
    async fn find_by_id(
        &self,
        id: &CommunityId,
    ) -> Result<Option<Community>, CommunityRepositoryError>;

    /// Remove one community document; idempotent.
    async fn delete(&self, id: &CommunityId) -> Result<(), CommunityRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCommunityRepository;

#[async_trait]
impl CommunityRepository for FixtureCommunityRepository {
    async fn create(
        &self,
        creator: &UserId,
        draft: CommunityDraft,
    ) -> Result<Community, CommunityRepositoryError> {
        let id = CommunityId::new("fixture-community")
            .map_err(|err| CommunityRepositoryError::query(err.to_string()))?;
        Ok(Community::from_draft(
            id,
            draft,
            creator.clone(),
            chrono::Utc::now(),
        ))
    }

    async fn list(&self) -> Result<Vec<Community>, CommunityRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _id: &CommunityId,
    ) -> Result<Option<Community>, CommunityRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _id: &CommunityId) -> Result<(), CommunityRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn fixture_create_preserves_the_draft_and_creator() {
        let repo = FixtureCommunityRepository;
        let creator = UserId::new("u-1").expect("uid");
        let draft = CommunityDraft::try_from_parts("Readers", "Book club", "Education", "None")
            .expect("draft");

        let community = repo.create(&creator, draft).await.expect("create");
        assert_eq!(community.name(), "Readers");
        assert!(community.is_creator(&creator));
    }

    #[tokio::test]
    async fn fixture_list_is_empty() {
        let repo = FixtureCommunityRepository;
        assert!(repo.list().await.expect("list").is_empty());
    }
}
