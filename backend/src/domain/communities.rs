//! Community use-cases: creation, listing, and creator-only deletion.
//!
//! Deletion is the one operation that touches both sides of the relation: it
//! removes the community document first (so concurrent join re-checks observe
//! the disappearance) and then runs the best-effort membership cascade.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::community::{Community, CommunityDraft, CommunityId};
use crate::domain::error::Error;
use crate::domain::membership::{CascadeReport, MembershipSynchronizer};
use crate::domain::ports::{
    CommunityCommand, CommunityOverview, CommunityQuery, CommunityRepository,
    CommunityRepositoryError, MembershipCommand, UserRepository,
};
use crate::domain::user::UserId;

/// Community service implementing the driving ports.
pub struct CommunityService<U, C> {
    communities: Arc<C>,
    membership: Arc<MembershipSynchronizer<U, C>>,
}

impl<U, C> CommunityService<U, C> {
    /// Create a new service over the repository and the synchroniser.
    pub fn new(communities: Arc<C>, membership: Arc<MembershipSynchronizer<U, C>>) -> Self {
        Self {
            communities,
            membership,
        }
    }
}

impl<U, C> CommunityService<U, C>
where
    U: UserRepository,
    C: CommunityRepository,
{
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

    async fn create_community(
        &self,
        creator: &UserId,
        draft: CommunityDraft,
    ) -> Result<Community, Error> {
        let community = self
            .communities
            .create(creator, draft)
            .await
            .map_err(Self::map_community_error)?;
        info!(community = %community.id(), creator = %creator, "community created");

        // The creator's own membership is a convenience on top of the
        // attribution seed; creation has already succeeded, so a failure
        // here is recorded rather than raised and the creator can re-join.
        if let Err(error) = self.membership.join(creator, community.id()).await {
            warn!(
                community = %community.id(),
                creator = %creator,
                error = %error,
                "creator self-join failed after creation"
            );
        }

        Ok(community)
    }

    async fn delete_community(
        &self,
        requester: &UserId,
        id: &CommunityId,
    ) -> Result<CascadeReport, Error> {
        let community = self
            .communities
            .find_by_id(id)
            .await
            .map_err(Self::map_community_error)?
            .ok_or_else(|| Error::not_found(format!("community {id} no longer exists")))?;

        if !community.is_creator(requester) {
            return Err(
                Error::forbidden("only the creator may delete a community").with_details(json!({
                    "community": id.as_ref(),
                    "requester": requester.as_ref(),
                })),
            );
        }

        // Capture the affected uids before the document disappears: the
        // derived roster plus the attribution seed.
        let mut affected = self.membership.members_of(id).await?;
        affected.extend(community.members().iter().cloned());

        self.communities
            .delete(id)
            .await
            .map_err(Self::map_community_error)?;
        info!(community = %id, requester = %requester, "community deleted");

        let report = self.membership.on_community_deleted(id, &affected).await;
        if !report.is_clean() {
            warn!(
                community = %id,
                failures = report.failures.len(),
                "deletion cascade left memberships for reconciliation"
            );
        }
        Ok(report)
    }

    async fn list_overviews(&self) -> Result<Vec<CommunityOverview>, Error> {
        let communities = self
            .communities
            .list()
            .await
            .map_err(Self::map_community_error)?;

        let mut overviews = Vec::with_capacity(communities.len());
        for community in communities {
            let member_count = self.membership.members_of(community.id()).await?.len();
            overviews.push(CommunityOverview {
                community,
                member_count,
            });
        }
        Ok(overviews)
    }

    async fn roster_of(&self, id: &CommunityId) -> Result<Vec<UserId>, Error> {
        let exists = self
            .communities
            .find_by_id(id)
            .await
            .map_err(Self::map_community_error)?
            .is_some();
        if !exists {
            return Err(Error::not_found(format!("community {id} no longer exists")));
        }
        self.membership.members_of(id).await
    }
}

#[async_trait]
impl<U, C> CommunityCommand for CommunityService<U, C>
where
    U: UserRepository,
    C: CommunityRepository,
{
    async fn create(&self, creator: &UserId, draft: CommunityDraft) -> Result<Community, Error> {
        self.create_community(creator, draft).await
    }

    async fn delete(
        &self,
        requester: &UserId,
        id: &CommunityId,
    ) -> Result<CascadeReport, Error> {
        self.delete_community(requester, id).await
    }
}

#[async_trait]
impl<U, C> CommunityQuery for CommunityService<U, C>
where
    U: UserRepository,
    C: CommunityRepository,
{
    async fn list(&self) -> Result<Vec<CommunityOverview>, Error> {
        self.list_overviews().await
    }

    async fn roster(&self, id: &CommunityId) -> Result<Vec<UserId>, Error> {
        self.roster_of(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockCommunityRepository, MockUserRepository};
    use crate::domain::user::{ProfileAttributes, UserProfile};
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).expect("uid")
    }

    fn cid(raw: &str) -> CommunityId {
        CommunityId::new(raw).expect("cid")
    }

    fn draft() -> CommunityDraft {
        CommunityDraft::try_from_parts("Readers", "Book club", "Education", "None")
            .expect("draft")
    }

    fn community(id: &CommunityId, creator: &UserId) -> Community {
        Community::from_draft(id.clone(), draft(), creator.clone(), Utc::now())
    }

    fn service(
        users: MockUserRepository,
        communities: MockCommunityRepository,
    ) -> CommunityService<MockUserRepository, MockCommunityRepository> {
        let users = Arc::new(users);
        let communities = Arc::new(communities);
        let membership = Arc::new(MembershipSynchronizer::new(users, Arc::clone(&communities)));
        CommunityService::new(communities, membership)
    }

    #[tokio::test]
    async fn create_persists_and_joins_the_creator() {
        let creator = uid("u-1");
        let id = cid("c-1");

        let mut communities = MockCommunityRepository::new();
        let created = community(&id, &creator);
        communities
            .expect_create()
            .times(1)
            .return_once(move |_, _| Ok(created));
        // The synchroniser re-checks existence before the self-join write.
        let re_read = community(&id, &creator);
        communities
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(re_read)));

        let mut users = MockUserRepository::new();
        let stored = UserProfile::new(creator.clone(), ProfileAttributes::default());
        users
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(stored)));
        let joined = id.clone();
        users
            .expect_add_community()
            .times(1)
            .return_once(move |_, _| Ok(BTreeSet::from([joined])));

        let created = service(users, communities)
            .create_community(&creator, draft())
            .await
            .expect("create succeeds");
        assert_eq!(created.id(), &id);
        assert!(created.members().contains(&creator));
    }

    #[tokio::test]
    async fn create_survives_a_failed_creator_self_join() {
        let creator = uid("u-1");
        let id = cid("c-1");

        let mut communities = MockCommunityRepository::new();
        let created = community(&id, &creator);
        communities
            .expect_create()
            .times(1)
            .return_once(move |_, _| Ok(created));
        communities
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Err(CommunityRepositoryError::unavailable("flaky")));

        let created = service(MockUserRepository::new(), communities)
            .create_community(&creator, draft())
            .await
            .expect("create still succeeds");
        assert_eq!(created.id(), &id);
    }

    #[tokio::test]
    async fn delete_rejects_non_creators() {
        let creator = uid("u-1");
        let intruder = uid("u-2");
        let id = cid("c-1");

        let mut communities = MockCommunityRepository::new();
        let stored = community(&id, &creator);
        communities
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(stored)));
        communities.expect_delete().times(0);

        let error = service(MockUserRepository::new(), communities)
            .delete_community(&intruder, &id)
            .await
            .expect_err("non-creator delete must fail");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn delete_cascades_over_roster_and_seed() {
        let creator = uid("u-1");
        let joiner = uid("u-2");
        let id = cid("c-1");

        let mut communities = MockCommunityRepository::new();
        let stored = community(&id, &creator);
        communities
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(stored)));
        communities.expect_delete().times(1).return_once(|_| Ok(()));

        let mut users = MockUserRepository::new();
        let roster = vec![joiner.clone()];
        users
            .expect_members_of()
            .times(1)
            .return_once(move |_| Ok(roster));
        // Roster plus the creator seed, deduplicated by the synchroniser.
        users
            .expect_remove_community()
            .times(2)
            .returning(|_, _| Ok(BTreeSet::new()));

        let report = service(users, communities)
            .delete_community(&creator, &id)
            .await
            .expect("delete succeeds");
        assert!(report.is_clean());
        assert_eq!(report.detached, vec![creator, joiner]);
    }

    #[tokio::test]
    async fn delete_reports_missing_communities() {
        let requester = uid("u-1");
        let id = cid("c-gone");

        let mut communities = MockCommunityRepository::new();
        communities
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Ok(None));

        let error = service(MockUserRepository::new(), communities)
            .delete_community(&requester, &id)
            .await
            .expect_err("missing community must fail");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn list_derives_member_counts_from_user_sets() {
        let creator = uid("u-1");
        let id = cid("c-1");

        let mut communities = MockCommunityRepository::new();
        let stored = community(&id, &creator);
        communities
            .expect_list()
            .times(1)
            .return_once(move || Ok(vec![stored]));

        let mut users = MockUserRepository::new();
        let roster = vec![creator.clone(), uid("u-2")];
        users
            .expect_members_of()
            .times(1)
            .return_once(move |_| Ok(roster));

        let overviews = service(users, communities)
            .list_overviews()
            .await
            .expect("list succeeds");
        assert_eq!(overviews.len(), 1);
        assert_eq!(overviews.first().map(|o| o.member_count), Some(2));
    }
}
