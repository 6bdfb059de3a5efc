//! Driving port for community listings and derived rosters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::community::{Community, CommunityId};
use crate::domain::error::Error;
use crate::domain::user::UserId;

/// One community plus its derived member count.
///
/// The count comes from querying user membership sets, not from a mutable
/// roster on the community document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityOverview {
    /// The stored community.
    #[serde(flatten)]
    pub community: Community,
    /// Number of users whose membership set references this community.
    pub member_count: usize,
}

/// Domain use-case port for community reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityQuery: Send + Sync {
    /// Snapshot of every community with derived member counts.
    async fn list(&self) -> Result<Vec<CommunityOverview>, Error>;

    /// Derived roster for one community; fails with `NotFound` when the
    /// community does not exist.
    async fn roster(&self, id: &CommunityId) -> Result<Vec<UserId>, Error>;
}

/// Fixture community query returning empty results.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCommunityQuery;

#[async_trait]
impl CommunityQuery for FixtureCommunityQuery {
    async fn list(&self) -> Result<Vec<CommunityOverview>, Error> {
        Ok(Vec::new())
    }

    async fn roster(&self, _id: &CommunityId) -> Result<Vec<UserId>, Error> {
        Ok(Vec::new())
    }
}
