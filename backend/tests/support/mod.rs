//! Shared wiring for integration suites: real adapters over the in-memory
//! document store, plus a session middleware configured for plain-HTTP tests.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use backend::domain::ports::FixtureSessionProvider;
use backend::domain::{AccountService, CommunityService, MembershipSynchronizer};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DocumentCommunityRepository, DocumentUserRepository, InMemoryDocumentStore,
};

pub type Users = DocumentUserRepository<InMemoryDocumentStore>;
pub type Communities = DocumentCommunityRepository<InMemoryDocumentStore>;
pub type Membership = MembershipSynchronizer<Users, Communities>;

/// Real adapters assembled exactly as the server wires them.
pub struct TestSystem {
    pub users: Arc<Users>,
    pub communities: Arc<Communities>,
    pub membership: Arc<Membership>,
    pub state: HttpState,
}

/// Wire a fresh system over an empty in-memory store.
pub fn system() -> TestSystem {
    let store = Arc::new(InMemoryDocumentStore::new());
    let users = Arc::new(DocumentUserRepository::new(Arc::clone(&store)));
    let communities = Arc::new(DocumentCommunityRepository::new(store));

    let membership = Arc::new(MembershipSynchronizer::new(
        Arc::clone(&users),
        Arc::clone(&communities),
    ));
    let community_service = Arc::new(CommunityService::new(
        Arc::clone(&communities),
        Arc::clone(&membership),
    ));
    let accounts = Arc::new(AccountService::new(
        Arc::new(FixtureSessionProvider::default()),
        Arc::clone(&users),
    ));

    let state = HttpState {
        accounts: accounts.clone(),
        profiles: accounts,
        communities: community_service.clone(),
        community_directory: community_service,
        memberships: membership.clone(),
    };

    TestSystem {
        users,
        communities,
        membership,
        state,
    }
}

/// Session middleware with a fresh key and the `Secure` flag disabled.
pub fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}
