//! Reconciliation properties exercised against the real adapters.
//!
//! Idempotence, commutativity, and the membership invariant from the
//! synchronisation contract, run over the in-memory document store.

// Shared harness has helpers used by other integration suites.
#[allow(dead_code)]
mod support;

use std::collections::BTreeSet;

use backend::domain::ports::{CommunityRepository, MembershipCommand, UserRepository};
use backend::domain::{CommunityDraft, CommunityId, Identity, ProfileAttributes, UserId};
use rstest::rstest;

use support::TestSystem;

fn uid(raw: &str) -> UserId {
    UserId::new(raw).expect("uid")
}

fn draft(name: &str) -> CommunityDraft {
    CommunityDraft::try_from_parts(name, "Book club", "Education", "None").expect("draft")
}

async fn provision_user(system: &TestSystem, raw: &str) -> UserId {
    let id = uid(raw);
    system
        .users
        .merge_upsert(&Identity::new(id.clone(), ProfileAttributes::default()))
        .await
        .expect("provision profile");
    id
}

async fn provision_community(system: &TestSystem, creator: &UserId, name: &str) -> CommunityId {
    system
        .communities
        .create(creator, draft(name))
        .await
        .expect("create community")
        .id()
        .clone()
}

#[rstest]
#[case::join(true)]
#[case::leave(false)]
#[tokio::test]
async fn join_and_leave_are_idempotent(#[case] joining: bool) {
    let system = support::system();
    let user = provision_user(&system, "user-1").await;
    let creator = provision_user(&system, "owner").await;
    let community = provision_community(&system, &creator, "Readers").await;

    if !joining {
        system
            .membership
            .join(&user, &community)
            .await
            .expect("initial join");
    }

    let run = || async {
        if joining {
            system.membership.join(&user, &community).await
        } else {
            system.membership.leave(&user, &community).await
        }
    };

    let first = run().await.expect("first call succeeds");
    let second = run().await.expect("repeat call succeeds");
    assert_eq!(first, second, "repeat call must not change the set");
    assert_eq!(second.contains(&community), joining);
}

#[tokio::test]
async fn concurrent_joins_by_different_users_both_land() {
    let system = support::system();
    let alice = provision_user(&system, "alice").await;
    let bob = provision_user(&system, "bob").await;
    let creator = provision_user(&system, "owner").await;
    let community = provision_community(&system, &creator, "Readers").await;

    let (left, right) = tokio::join!(
        system.membership.join(&alice, &community),
        system.membership.join(&bob, &community),
    );
    left.expect("alice joins");
    right.expect("bob joins");

    let roster = system
        .membership
        .members_of(&community)
        .await
        .expect("roster");
    let roster: BTreeSet<UserId> = roster.into_iter().collect();
    assert!(roster.contains(&alice));
    assert!(roster.contains(&bob));
}

#[tokio::test]
async fn memberships_reference_live_communities_absent_concurrent_deletes() {
    let system = support::system();
    let user = provision_user(&system, "user-1").await;
    let creator = provision_user(&system, "owner").await;

    let mut joined = Vec::new();
    for name in ["Readers", "Writers", "Gardeners"] {
        let community = provision_community(&system, &creator, name).await;
        system
            .membership
            .join(&user, &community)
            .await
            .expect("join");
        joined.push(community);
    }
    system
        .membership
        .leave(&user, joined.first().expect("joined at least one"))
        .await
        .expect("leave");

    let memberships = system.membership.memberships(&user).await.expect("set");
    for community in &memberships {
        let exists = system
            .communities
            .find_by_id(community)
            .await
            .expect("lookup")
            .is_some();
        assert!(exists, "membership {community} references a live community");
    }
    assert_eq!(memberships.len(), 2);
}

#[tokio::test]
async fn delete_cascade_detaches_every_member() {
    let system = support::system();
    let creator = provision_user(&system, "owner").await;
    let users = [
        provision_user(&system, "u-1").await,
        provision_user(&system, "u-2").await,
        provision_user(&system, "u-3").await,
    ];
    let community = provision_community(&system, &creator, "Readers").await;
    for user in &users {
        system
            .membership
            .join(user, &community)
            .await
            .expect("join");
    }

    system
        .communities
        .delete(&community)
        .await
        .expect("delete document");
    let affected: Vec<UserId> = users.iter().cloned().chain([creator.clone()]).collect();
    let report = system
        .membership
        .on_community_deleted(&community, &affected)
        .await;

    assert!(report.is_clean());
    for user in users.iter().chain([&creator]) {
        let set = system.membership.memberships(user).await.expect("set");
        assert!(!set.contains(&community), "{user} still references {community}");
    }
}
