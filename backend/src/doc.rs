//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification for the REST API. It
//! registers every HTTP endpoint from the inbound layer, the domain schemas
//! they reference, and the session-cookie security scheme. Swagger UI serves
//! the document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/session.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Voices Unheard backend API",
        description = "Session-authenticated HTTP interface for sign-in, profiles, \
            and community membership."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::sign_in,
        crate::inbound::http::accounts::sign_out,
        crate::inbound::http::accounts::current_profile,
        crate::inbound::http::communities::list_communities,
        crate::inbound::http::communities::create_community,
        crate::inbound::http::communities::delete_community,
        crate::inbound::http::communities::community_members,
        crate::inbound::http::memberships::join_community,
        crate::inbound::http::memberships::leave_community,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::UserProfile,
        crate::domain::ProfileAttributes,
        crate::domain::Community,
        crate::domain::CascadeReport,
        crate::domain::CascadeFailure,
        crate::domain::ports::CommunityOverview,
        crate::inbound::http::accounts::SignInRequest,
        crate::inbound::http::communities::CreateCommunityRequest,
        crate::inbound::http::memberships::MembershipResponse,
    )),
    tags(
        (name = "accounts", description = "Sign-in, sign-out, and the profile view"),
        (name = "communities", description = "Community CRUD and rosters"),
        (name = "memberships", description = "Join and leave operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
