//! Driving port for join/leave membership mutations.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::community::CommunityId;
use crate::domain::error::Error;
use crate::domain::user::UserId;

/// Domain use-case port for membership mutations.
///
/// Both operations are idempotent and return the membership set as stored
/// after the operation, so the caller can reconcile tentative local state
/// against backend truth.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipCommand: Send + Sync {
    /// Join a community.
    async fn join(
        &self,
        uid: &UserId,
        community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, Error>;

    /// Leave a community.
    async fn leave(
        &self,
        uid: &UserId,
        community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, Error>;
}

/// Fixture membership command used by handler tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMembershipCommand;

#[async_trait]
impl MembershipCommand for FixtureMembershipCommand {
    async fn join(
        &self,
        _uid: &UserId,
        community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, Error> {
        Ok(BTreeSet::from([community.clone()]))
    }

    async fn leave(
        &self,
        _uid: &UserId,
        _community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, Error> {
        Ok(BTreeSet::new())
    }
}
