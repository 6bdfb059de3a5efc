//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use backend::ApiDoc;
use backend::domain::ports::FixtureSessionProvider;
use backend::domain::{AccountService, CommunityService, MembershipSynchronizer};
use backend::inbound::http::accounts::{current_profile, sign_in, sign_out};
use backend::inbound::http::communities::{
    community_members, create_community, delete_community, list_communities,
};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::memberships::{join_community, leave_community};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DocumentCommunityRepository, DocumentUserRepository, InMemoryDocumentStore,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Wire the port implementations over the in-memory store.
///
/// The in-memory store and the fixture session provider stand in until a
/// hosted document store and a real identity integration are configured.
fn build_http_state() -> HttpState {
    let store = Arc::new(InMemoryDocumentStore::new());
    let users = Arc::new(DocumentUserRepository::new(Arc::clone(&store)));
    let communities = Arc::new(DocumentCommunityRepository::new(store));

    let membership = Arc::new(MembershipSynchronizer::new(
        Arc::clone(&users),
        Arc::clone(&communities),
    ));
    let community_service = Arc::new(CommunityService::new(communities, Arc::clone(&membership)));
    let accounts = Arc::new(AccountService::new(
        Arc::new(FixtureSessionProvider::default()),
        users,
    ));

    HttpState {
        accounts: accounts.clone(),
        profiles: accounts,
        communities: community_service.clone(),
        community_directory: community_service,
        memberships: membership,
    }
}

/// Build and start the HTTP server.
///
/// # Errors
/// Returns [`std::io::Error`] when binding the listen address fails.
pub fn run(config: ServerConfig) -> std::io::Result<Server> {
    let health_state = web::Data::new(HealthState::new());
    let http_state = web::Data::new(build_http_state());
    let server_health_state = health_state.clone();

    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
    } = config;

    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".to_owned())
            .cookie_secure(cookie_secure)
            .cookie_same_site(same_site)
            .build();

        let app = App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .wrap(session)
            .service(ready)
            .service(live)
            .service(
                web::scope("/api/v1")
                    .service(sign_in)
                    .service(sign_out)
                    .service(current_profile)
                    .service(list_communities)
                    .service(create_community)
                    .service(delete_community)
                    .service(community_members)
                    .service(join_community)
                    .service(leave_community),
            );

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
