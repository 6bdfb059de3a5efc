//! Driving port for community creation and deletion.

use async_trait::async_trait;

use crate::domain::community::{Community, CommunityDraft, CommunityId};
use crate::domain::error::Error;
use crate::domain::membership::CascadeReport;
use crate::domain::user::UserId;

/// Domain use-case port for community mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityCommand: Send + Sync {
    /// Create a community owned by `creator`.
    async fn create(&self, creator: &UserId, draft: CommunityDraft) -> Result<Community, Error>;

    /// Delete a community and cascade membership cleanup.
    ///
    /// Fails with `Forbidden` unless `requester` is the creator and with
    /// `NotFound` when the community is already gone.
    async fn delete(
        &self,
        requester: &UserId,
        id: &CommunityId,
    ) -> Result<CascadeReport, Error>;
}

/// Fixture community command used by handler tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCommunityCommand;

#[async_trait]
impl CommunityCommand for FixtureCommunityCommand {
    async fn create(&self, creator: &UserId, draft: CommunityDraft) -> Result<Community, Error> {
        let id = CommunityId::new("fixture-community")
            .map_err(|err| Error::internal(format!("invalid fixture community id: {err}")))?;
        Ok(Community::from_draft(
            id,
            draft,
            creator.clone(),
            chrono::Utc::now(),
        ))
    }

    async fn delete(
        &self,
        _requester: &UserId,
        id: &CommunityId,
    ) -> Result<CascadeReport, Error> {
        Ok(CascadeReport {
            community: id.clone(),
            detached: Vec::new(),
            failures: Vec::new(),
        })
    }
}
