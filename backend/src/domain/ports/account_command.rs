//! Driving port for the sign-in/sign-out use-cases.
//!
//! Inbound adapters call this to run the account lifecycle without knowing
//! which identity provider or store backs it, which keeps handler tests
//! deterministic.

use async_trait::async_trait;

use crate::domain::auth::IdentityAssertion;
use crate::domain::error::Error;
use crate::domain::user::{UserId, UserProfile};

/// Domain use-case port for the account lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Authenticate an assertion and upsert the profile document.
    async fn sign_in(&self, assertion: &IdentityAssertion) -> Result<UserProfile, Error>;

    /// End the provider-side session.
    async fn sign_out(&self) -> Result<(), Error>;
}

/// Fixture account command used by handler tests.
///
/// Signs any assertion in as a fixed uid with no disclosed attributes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountCommand;

/// Uid produced by [`FixtureAccountCommand`].
pub const FIXTURE_UID: &str = "fixture-user";

#[async_trait]
impl AccountCommand for FixtureAccountCommand {
    async fn sign_in(&self, _assertion: &IdentityAssertion) -> Result<UserProfile, Error> {
        let uid = UserId::new(FIXTURE_UID)
            .map_err(|err| Error::internal(format!("invalid fixture uid: {err}")))?;
        Ok(UserProfile::new(uid, Default::default()))
    }

    async fn sign_out(&self) -> Result<(), Error> {
        Ok(())
    }
}
