//! Port for the external identity service.
//!
//! In hexagonal terms this is a driven port: the account service exchanges an
//! identity assertion for a resolved identity without knowing which provider
//! backs it. The subscription primitive mirrors the provider's auth-change
//! feed; its contract is that unsubscribing is idempotent and no event is
//! delivered after unsubscription.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use async_trait::async_trait;

use crate::domain::auth::{Identity, IdentityAssertion};
use crate::domain::user::UserId;

/// Errors raised by session provider adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionProviderError {
    /// The external sign-in flow was aborted or the assertion was not
    /// recognised.
    #[error("sign-in cancelled: {message}")]
    Cancelled {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// The provider could not be reached.
    #[error("session provider unavailable: {message}")]
    Unavailable {
        /// Adapter-supplied diagnostic.
        message: String,
    },
}

impl SessionProviderError {
    /// Build a [`SessionProviderError::Cancelled`] error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    /// Build a [`SessionProviderError::Unavailable`] error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Callback fired on every sign-in (`Some`) or sign-out (`None`) transition.
pub type AuthListener = Box<dyn Fn(Option<&Identity>) + Send + Sync>;

type ListenerMap = HashMap<u64, AuthListener>;

/// Handle returned by [`SessionProvider::subscribe`].
///
/// `unsubscribe` is idempotent; once it returns, the listener is never
/// invoked again. Dropping the handle without unsubscribing leaves the
/// listener registered for the provider's lifetime.
pub struct AuthSubscription {
    listeners: Weak<Mutex<ListenerMap>>,
    key: u64,
}

impl AuthSubscription {
    /// Detach the listener. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.key);
        }
    }
}

/// Listener bookkeeping shared by session provider adapters.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Arc<Mutex<ListenerMap>>,
    next_key: Arc<AtomicU64>,
}

impl ListenerRegistry {
    /// Register a listener and hand back its subscription handle.
    pub fn subscribe(&self, listener: AuthListener) -> AuthSubscription {
        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, listener);
        AuthSubscription {
            listeners: Arc::downgrade(&self.listeners),
            key,
        }
    }

    /// Deliver an auth transition to every registered listener.
    pub fn notify(&self, identity: Option<&Identity>) {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.values() {
            listener(identity);
        }
    }
}

/// Contract of the external identity service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Exchange an assertion for a resolved identity.
    async fn sign_in(&self, assertion: &IdentityAssertion)
    -> Result<Identity, SessionProviderError>;

    /// End the provider-side session.
    async fn sign_out(&self) -> Result<(), SessionProviderError>;

    /// Watch auth transitions; see [`AuthSubscription`] for the contract.
    fn subscribe(&self, listener: AuthListener) -> AuthSubscription;
}

/// Scripted provider used until a real identity integration is wired.
///
/// Assertions of the form `fixture:<uid>` resolve to that uid with no
/// disclosed attributes; anything else behaves as an aborted flow.
#[derive(Clone, Default)]
pub struct FixtureSessionProvider {
    registry: ListenerRegistry,
}

#[async_trait]
impl SessionProvider for FixtureSessionProvider {
    async fn sign_in(
        &self,
        assertion: &IdentityAssertion,
    ) -> Result<Identity, SessionProviderError> {
        let Some(uid) = assertion.as_str().strip_prefix("fixture:") else {
            return Err(SessionProviderError::cancelled(
                "assertion not recognised by the fixture provider",
            ));
        };
        let uid = UserId::new(uid)
            .map_err(|err| SessionProviderError::cancelled(format!("invalid fixture uid: {err}")))?;
        let identity = Identity::new(uid, Default::default());
        self.registry.notify(Some(&identity));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), SessionProviderError> {
        self.registry.notify(None);
        Ok(())
    }

    fn subscribe(&self, listener: AuthListener) -> AuthSubscription {
        self.registry.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn assertion(raw: &str) -> IdentityAssertion {
        IdentityAssertion::try_from_raw(raw).expect("assertion")
    }

    #[tokio::test]
    async fn fixture_resolves_prefixed_assertions() {
        let provider = FixtureSessionProvider::default();
        let identity = provider
            .sign_in(&assertion("fixture:alice"))
            .await
            .expect("sign-in succeeds");
        assert_eq!(identity.uid().as_ref(), "alice");
    }

    #[tokio::test]
    async fn fixture_cancels_unknown_assertions() {
        let provider = FixtureSessionProvider::default();
        let err = provider
            .sign_in(&assertion("google-oauth-token"))
            .await
            .expect_err("unknown assertion cancels");
        assert!(matches!(err, SessionProviderError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn listeners_fire_per_transition_and_stop_after_unsubscribe() {
        let provider = FixtureSessionProvider::default();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let subscription = provider.subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        provider
            .sign_in(&assertion("fixture:alice"))
            .await
            .expect("sign-in");
        provider.sign_out().await.expect("sign-out");
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        subscription.unsubscribe();
        subscription.unsubscribe();
        provider
            .sign_in(&assertion("fixture:bob"))
            .await
            .expect("sign-in");
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
