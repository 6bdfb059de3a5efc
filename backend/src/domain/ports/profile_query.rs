//! Driving port for the profile view.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::user::{UserId, UserProfile};

/// Domain use-case port for reading the signed-in user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Fetch the stored profile; fails with `NotFound` when the user has
    /// never signed in.
    async fn profile(&self, uid: &UserId) -> Result<UserProfile, Error>;
}

/// Fixture profile query echoing the requested uid back with no attributes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfileQuery;

#[async_trait]
impl ProfileQuery for FixtureProfileQuery {
    async fn profile(&self, uid: &UserId) -> Result<UserProfile, Error> {
        Ok(UserProfile::new(uid.clone(), Default::default()))
    }
}
