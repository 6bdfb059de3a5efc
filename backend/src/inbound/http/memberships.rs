//! Membership API handlers.
//!
//! ```text
//! PUT    /api/v1/users/me/communities/{id}
//! DELETE /api/v1/users/me/communities/{id}
//! ```
//!
//! Both endpoints are idempotent and return the membership set as stored, so
//! a client can reconcile tentative local state (and roll it back on a typed
//! failure) instead of assuming the write succeeded.

use std::collections::BTreeSet;

use actix_web::{delete, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CommunityId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::communities::parse_community_id;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Membership set as stored after a join or leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    /// Ids of the communities the user has joined.
    #[schema(value_type = Vec<String>)]
    pub communities: BTreeSet<CommunityId>,
}

/// Join a community.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/communities/{id}",
    params(("id" = String, Path, description = "Community id")),
    responses(
        (status = 200, description = "Joined (or already a member)", body = MembershipResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Community no longer exists", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "joinCommunity"
)]
#[put("/users/me/communities/{id}")]
pub async fn join_community(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<MembershipResponse>> {
    let uid = session.require_user_id()?;
    let id = parse_community_id(&path.into_inner())?;
    let communities = state.memberships.join(&uid, &id).await?;
    Ok(web::Json(MembershipResponse { communities }))
}

/// Leave a community.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me/communities/{id}",
    params(("id" = String, Path, description = "Community id")),
    responses(
        (status = 200, description = "Left (or was not a member)", body = MembershipResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "leaveCommunity"
)]
#[delete("/users/me/communities/{id}")]
pub async fn leave_community(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<MembershipResponse>> {
    let uid = session.require_user_id()?;
    let id = parse_community_id(&path.into_inner())?;
    let communities = state.memberships.leave(&uid, &id).await?;
    Ok(web::Json(MembershipResponse { communities }))
}
