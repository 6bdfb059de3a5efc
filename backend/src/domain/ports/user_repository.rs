//! Port for user profile persistence.
//!
//! The membership set on the profile document is the canonical side of the
//! user/community relation, so this port carries the set mutations
//! (`add_community`, `remove_community`) and the derived roster query that
//! replaces a mirrored member list on the community side.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::auth::Identity;
use crate::domain::community::CommunityId;
use crate::domain::user::{UserId, UserProfile};

/// Errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// The backing store could not be reached.
    #[error("user repository unavailable: {message}")]
    Unavailable {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// No profile document exists for the given uid.
    #[error("no profile stored for user {uid}")]
    ProfileMissing {
        /// The uid that had no document.
        uid: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-supplied diagnostic.
        message: String,
    },
}

impl UserRepositoryError {
    /// Build an [`UserRepositoryError::Unavailable`] error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Build a [`UserRepositoryError::ProfileMissing`] error.
    pub fn profile_missing(uid: impl Into<String>) -> Self {
        Self::ProfileMissing { uid: uid.into() }
    }

    /// Build a [`UserRepositoryError::Query`] error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for profile storage and membership set mutation.
///
/// # Set semantics
///
/// `add_community` and `remove_community` must be expressed as commutative
/// set operations against the stored document (never read-modify-write of the
/// whole set), so concurrent mutations from different clients commute. Both
/// return the membership set as stored after the mutation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a profile by uid; `None` when the user has never signed in.
    async fn find_by_id(&self, uid: &UserId) -> Result<Option<UserProfile>, UserRepositoryError>;

    /// Create-or-refresh the profile for a freshly authenticated identity.
    ///
    /// First sign-in creates the document with an empty membership set; later
    /// sign-ins overlay the provider attributes and must leave the membership
    /// set and any unknown stored fields untouched.
    async fn merge_upsert(&self, identity: &Identity) -> Result<UserProfile, UserRepositoryError>;

    /// Add a community id to the user's membership set.
    async fn add_community(
        &self,
        uid: &UserId,
        community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, UserRepositoryError>;

    /// Remove a community id from the user's membership set.
    async fn remove_community(
        &self,
        uid: &UserId,
        community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, UserRepositoryError>;

    /// Derived roster: uids whose membership set contains `community`.
    async fn members_of(
        &self,
        community: &CommunityId,
    ) -> Result<Vec<UserId>, UserRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// Lookups miss, upserts echo the identity back as a fresh profile, and set
/// mutations report the obvious single-element or empty result.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn find_by_id(&self, _uid: &UserId) -> Result<Option<UserProfile>, UserRepositoryError> {
        Ok(None)
    }

    async fn merge_upsert(&self, identity: &Identity) -> Result<UserProfile, UserRepositoryError> {
        Ok(UserProfile::new(
            identity.uid().clone(),
            identity.attributes().clone(),
        ))
    }

    async fn add_community(
        &self,
        _uid: &UserId,
        community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, UserRepositoryError> {
        Ok(BTreeSet::from([community.clone()]))
    }

    async fn remove_community(
        &self,
        _uid: &UserId,
        _community: &CommunityId,
    ) -> Result<BTreeSet<CommunityId>, UserRepositoryError> {
        Ok(BTreeSet::new())
    }

    async fn members_of(
        &self,
        _community: &CommunityId,
    ) -> Result<Vec<UserId>, UserRepositoryError> {
        Ok(Vec::new())
    }
}
