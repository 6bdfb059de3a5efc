//! Account API handlers.
//!
//! ```text
//! POST   /api/v1/session  {"assertion":"..."}
//! DELETE /api/v1/session
//! GET    /api/v1/users/me
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{AuthValidationError, Error, IdentityAssertion, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Sign-in request body for `POST /api/v1/session`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// Provider-issued identity assertion.
    pub assertion: String,
}

fn map_auth_validation_error(err: AuthValidationError) -> Error {
    match err {
        AuthValidationError::EmptyAssertion => {
            Error::invalid_request("identity assertion must not be empty")
                .with_details(json!({ "field": "assertion", "code": "empty_assertion" }))
        }
    }
}

/// Sign in, upsert the profile document, and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/session",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = UserProfile,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Sign-in cancelled or rejected", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "signIn",
    security([])
)]
#[post("/session")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignInRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let assertion = IdentityAssertion::try_from_raw(&payload.assertion)
        .map_err(map_auth_validation_error)?;
    let profile = state.accounts.sign_in(&assertion).await?;
    session.persist_user(profile.id())?;
    Ok(web::Json(profile))
}

/// Sign out and drop the session.
#[utoipa::path(
    delete,
    path = "/api/v1/session",
    responses(
        (status = 204, description = "Signed out"),
        (status = 503, description = "Identity provider unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "signOut",
    security([])
)]
#[delete("/session")]
pub async fn sign_out(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    state.accounts.sign_out().await?;
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

/// Current user's profile view.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "No profile stored", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "currentProfile"
)]
#[get("/users/me")]
pub async fn current_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let uid = session.require_user_id()?;
    let profile = state.profiles.profile(&uid).await?;
    Ok(web::Json(profile))
}
