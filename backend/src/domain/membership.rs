//! Membership synchronisation between user profiles and communities.
//!
//! The user-owned membership set is the single mutable side of the relation.
//! Every operation re-reads the store's current copy immediately before
//! mutating so that stale in-memory state from an earlier fetch never drives
//! a write, and every mutation is a commutative set operation on one
//! document. The deletion cascade is explicitly best-effort: one user's
//! failed cleanup never blocks the others.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::community::CommunityId;
use crate::domain::error::Error;
use crate::domain::ports::{
    CommunityRepository, CommunityRepositoryError, MembershipCommand, UserRepository,
    UserRepositoryError,
};
use crate::domain::user::UserId;

/// One user whose cleanup write failed during a deletion cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CascadeFailure {
    /// The user whose membership set still references the deleted community.
    #[schema(value_type = String)]
    pub user: UserId,
    /// Diagnostic for the failed write.
    pub reason: String,
}

/// Outcome of the best-effort fan-out after a community deletion.
///
/// Failures are collected, not raised: they are reported for retry or manual
/// reconciliation while every other user's cleanup proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    /// The deleted community.
    #[schema(value_type = String)]
    pub community: CommunityId,
    /// Users whose membership sets no longer reference the community.
    #[schema(value_type = Vec<String>)]
    pub detached: Vec<UserId>,
    /// Users whose cleanup write failed.
    pub failures: Vec<CascadeFailure>,
}

impl CascadeReport {
    /// Whether every affected user was detached.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reconciles user membership sets against community records.
#[derive(Clone)]
pub struct MembershipSynchronizer<U, C> {
    users: Arc<U>,
    communities: Arc<C>,
}

impl<U, C> MembershipSynchronizer<U, C> {
    /// Create a synchroniser over the given repositories.
    pub fn new(users: Arc<U>, communities: Arc<C>) -> Self {
        Self { users, communities }
    }
}

impl<U, C> MembershipSynchronizer<U, C>
where
    U: UserRepository,
    C: CommunityRepository,
{
    fn map_user_error(error: UserRepositoryError) -> Error {
        match error {
            UserRepositoryError::Unavailable { message } => {
                Error::service_unavailable(format!("user store unavailable: {message}"))
            }
            UserRepositoryError::ProfileMissing { uid } => {
                Error::not_found(format!("no profile stored for user {uid}"))
            }
            UserRepositoryError::Query { message } => {
                Error::internal(format!("user store error: {message}"))
            }
        }
    }

    fn map_community_error(error: CommunityRepositoryError) -> Error {
        match error {
            CommunityRepositoryError::Unavailable { message } => {
                Error::service_unavailable(format!("community store unavailable: {message}"))
            }
            CommunityRepositoryError::Query { message } => {
                Error::internal(format!("community store error: {message}"))
            }
        }
    }

    async fn current_profile(
        &self,
        uid: &UserId,
    ) -> Result<crate::domain::user::UserProfile, Error> {
        self.users
            .find_by_id(uid)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found(format!("no profile stored for user {uid}")))
    }

    /// The user's current membership set.
    pub async fn memberships(&self, uid: &UserId) -> Result<BTreeSet<CommunityId>, Error> {
        Ok(self.current_profile(uid).await?.communities().clone())
    }

    /// Derived roster: every uid whose membership set contains `community`.
    pub async fn members_of(&self, community: &CommunityId) -> Result<Vec<UserId>, Error> {
        self.users
            .members_of(community)
            .await
            .map_err(Self::map_user_error)
    }

    /// Best-effort fan-out removing a deleted community from each affected
    /// user's membership set.
    ///
    /// Duplicate uids in `affected` are collapsed. Failures are logged and
    /// collected in the report; they never abort the remaining cleanups.
    pub async fn on_community_deleted(
        &self,
        community: &CommunityId,
        affected: &[UserId],
    ) -> CascadeReport {
        let unique: BTreeSet<&UserId> = affected.iter().collect();
        let mut detached = Vec::with_capacity(unique.len());
        let mut failures = Vec::new();

        for uid in unique {
            match self.users.remove_community(uid, community).await {
                Ok(_) => detached.push(uid.clone()),
                Err(error) => {
                    warn!(
                        user = %uid,
                        community = %community,
                        error = %error,
                        "membership cleanup failed; recorded for reconciliation"
                    );
                    failures.push(CascadeFailure {
                        user: uid.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        CascadeReport {
            community: community.clone(),
            detached,
            failures,
        }
    }
}

#[async_trait::async_trait]
impl<U, C> MembershipCommand for MembershipSynchronizer<U, C>
where
    U: UserRepository,
    C: CommunityRepository,
{
    /// Add `community` to the user's membership set.
    ///
    /// Re-checks that the community still exists (it may have been deleted
    /// between UI render and submission) and that the membership is not
    /// already present; duplicate submissions succeed without writing.
    async fn join(
        &self,
        uid: &UserId,
        community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, Error> {
        let exists = self
            .communities
            .find_by_id(community)
            .await
            .map_err(Self::map_community_error)?
            .is_some();
        if !exists {
            return Err(Error::not_found(format!(
                "community {community} no longer exists"
            )));
        }

        let profile = self.current_profile(uid).await?;
        if profile.has_joined(community) {
            return Ok(profile.communities().clone());
        }

        self.users
            .add_community(uid, community)
            .await
            .map_err(Self::map_user_error)
    }

    /// Remove `community` from the user's membership set.
    ///
    /// Deliberately does not require the community to exist: leaving a
    /// community that was deleted concurrently is a no-op success.
    async fn leave(
        &self,
        uid: &UserId,
        community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, Error> {
        let profile = self.current_profile(uid).await?;
        if !profile.has_joined(community) {
            return Ok(profile.communities().clone());
        }

        self.users
            .remove_community(uid, community)
            .await
            .map_err(Self::map_user_error)
    }
}
