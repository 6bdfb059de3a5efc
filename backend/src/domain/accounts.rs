//! Account lifecycle: sign-in upsert, sign-out, and the profile view.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::auth::IdentityAssertion;
use crate::domain::error::Error;
use crate::domain::ports::{
    AccountCommand, ProfileQuery, SessionProvider, SessionProviderError, UserRepository,
    UserRepositoryError,
};
use crate::domain::user::{UserId, UserProfile};

/// Account service implementing the driving ports.
pub struct AccountService<P, U> {
    provider: Arc<P>,
    users: Arc<U>,
}

impl<P, U> AccountService<P, U> {
    /// Create a new service over the identity provider and the user store.
    pub fn new(provider: Arc<P>, users: Arc<U>) -> Self {
        Self { provider, users }
    }
}

impl<P, U> AccountService<P, U>
where
    P: SessionProvider,
    U: UserRepository,
{
    fn map_provider_error(error: SessionProviderError) -> Error {
        match error {
            SessionProviderError::Cancelled { message } => {
                Error::unauthorized(format!("sign-in did not complete: {message}"))
                    .with_details(json!({ "code": "auth_cancelled" }))
            }
            SessionProviderError::Unavailable { message } => {
                Error::service_unavailable(format!("identity provider unavailable: {message}"))
            }
        }
    }

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

    async fn sign_in_and_upsert(&self, assertion: &IdentityAssertion) -> Result<UserProfile, Error> {
        let identity = self
            .provider
            .sign_in(assertion)
            .await
            .map_err(Self::map_provider_error)?;

        // First sign-in creates the document; later sign-ins refresh the
        // provider attributes and leave the membership set untouched.
        let profile = self
            .users
            .merge_upsert(&identity)
            .await
            .map_err(Self::map_user_error)?;
        info!(user = %profile.id(), "signed in");
        Ok(profile)
    }

    async fn provider_sign_out(&self) -> Result<(), Error> {
        self.provider
            .sign_out()
            .await
            .map_err(Self::map_provider_error)
    }

    async fn stored_profile(&self, uid: &UserId) -> Result<UserProfile, Error> {
        self.users
            .find_by_id(uid)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found(format!("no profile stored for user {uid}")))
    }
}

#[async_trait]
impl<P, U> AccountCommand for AccountService<P, U>
where
    P: SessionProvider,
    U: UserRepository,
{
    async fn sign_in(&self, assertion: &IdentityAssertion) -> Result<UserProfile, Error> {
        self.sign_in_and_upsert(assertion).await
    }

    async fn sign_out(&self) -> Result<(), Error> {
        self.provider_sign_out().await
    }
}

#[async_trait]
impl<P, U> ProfileQuery for AccountService<P, U>
where
    P: SessionProvider,
    U: UserRepository,
{
    async fn profile(&self, uid: &UserId) -> Result<UserProfile, Error> {
        self.stored_profile(uid).await
    }
}
