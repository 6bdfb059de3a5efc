//! Community API handlers.
//!
//! ```text
//! GET    /api/v1/communities
//! POST   /api/v1/communities
//! DELETE /api/v1/communities/{id}
//! GET    /api/v1/communities/{id}/members
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::CommunityOverview;
use crate::domain::{
    CascadeReport, Community, CommunityDraft, CommunityId, CommunityValidationError, Error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Creation request body for `POST /api/v1/communities`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityRequest {
    /// Name shown in listings.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Free-text category label.
    pub category: String,
    /// Questions shown to prospective joiners.
    pub questions: String,
}

impl TryFrom<CreateCommunityRequest> for CommunityDraft {
    type Error = CommunityValidationError;

    fn try_from(value: CreateCommunityRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.name,
            &value.description,
            &value.category,
            &value.questions,
        )
    }
}

fn map_community_validation_error(err: CommunityValidationError) -> Error {
    let field = match err {
        CommunityValidationError::InvalidId => "id",
        CommunityValidationError::EmptyName | CommunityValidationError::NameTooLong { .. } => {
            "name"
        }
        CommunityValidationError::EmptyDescription => "description",
        CommunityValidationError::EmptyCategory => "category",
        CommunityValidationError::EmptyQuestions => "questions",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

pub(crate) fn parse_community_id(raw: &str) -> Result<CommunityId, Error> {
    CommunityId::new(raw).map_err(map_community_validation_error)
}

/// List every community with its derived member count.
#[utoipa::path(
    get,
    path = "/api/v1/communities",
    responses(
        (status = 200, description = "Communities", body = [CommunityOverview]),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["communities"],
    operation_id = "listCommunities",
    security([])
)]
#[get("/communities")]
pub async fn list_communities(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CommunityOverview>>> {
    let overviews = state.community_directory.list().await?;
    Ok(web::Json(overviews))
}

/// Create a community owned by the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/communities",
    request_body = CreateCommunityRequest,
    responses(
        (status = 201, description = "Created", body = Community),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["communities"],
    operation_id = "createCommunity"
)]
#[post("/communities")]
pub async fn create_community(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCommunityRequest>,
) -> ApiResult<HttpResponse> {
    let creator = session.require_user_id()?;
    let draft =
        CommunityDraft::try_from(payload.into_inner()).map_err(map_community_validation_error)?;
    let community = state.communities.create(&creator, draft).await?;
    Ok(HttpResponse::Created().json(community))
}

/// Delete a community; restricted to its creator.
///
/// The response reports the best-effort membership cascade so operators can
/// retry any failed cleanups.
#[utoipa::path(
    delete,
    path = "/api/v1/communities/{id}",
    params(("id" = String, Path, description = "Community id")),
    responses(
        (status = 200, description = "Deleted; cascade report", body = CascadeReport),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the creator", body = Error),
        (status = 404, description = "Community no longer exists", body = Error)
    ),
    tags = ["communities"],
    operation_id = "deleteCommunity"
)]
#[delete("/communities/{id}")]
pub async fn delete_community(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CascadeReport>> {
    let requester = session.require_user_id()?;
    let id = parse_community_id(&path.into_inner())?;
    let report = state.communities.delete(&requester, &id).await?;
    Ok(web::Json(report))
}

/// Derived roster of one community.
#[utoipa::path(
    get,
    path = "/api/v1/communities/{id}/members",
    params(("id" = String, Path, description = "Community id")),
    responses(
        (status = 200, description = "Member uids", body = [String]),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Community no longer exists", body = Error)
    ),
    tags = ["communities"],
    operation_id = "communityMembers",
    security([])
)]
#[get("/communities/{id}/members")]
pub async fn community_members(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_community_id(&path.into_inner())?;
    let members = state.community_directory.roster(&id).await?;
    Ok(HttpResponse::Ok().json(members))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::domain::ports::MockCommunityCommand;
    use crate::inbound::http::accounts::{SignInRequest, sign_in};
    use actix_web::cookie::Cookie;
    use actix_web::{App, test as actix_test, web};
    use serde_json::Value;
    use std::sync::Arc;

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
                actix_web::dev::ServiceRequest,
                Config = (),
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(sign_in)
                    .service(list_communities)
                    .service(create_community)
                    .service(delete_community)
                    .service(community_members),
            )
    }

    async fn session_cookie<S>(app: &S) -> Cookie<'static>
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/session")
                .set_json(&SignInRequest {
                    assertion: "token".into(),
                })
                .to_request(),
        )
        .await;
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    #[actix_web::test]
    async fn listing_is_public() {
        let app = actix_test::init_service(test_app(HttpState::default())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/communities")
                .to_request(),
        )
        .await;
        assert!(response.status().is_success());
    }

    #[actix_web::test]
    async fn creation_requires_a_session() {
        let app = actix_test::init_service(test_app(HttpState::default())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/communities")
                .set_json(&CreateCommunityRequest {
                    name: "Readers".into(),
                    description: "Book club".into(),
                    category: "Education".into(),
                    questions: "None".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn creation_validates_every_field() {
        let app = actix_test::init_service(test_app(HttpState::default())).await;
        let cookie = session_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/communities")
                .cookie(cookie)
                .set_json(&CreateCommunityRequest {
                    name: "Readers".into(),
                    description: "  ".into(),
                    category: "Education".into(),
                    questions: "None".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("error payload");
        assert_eq!(
            value
                .get("details")
                .and_then(|d| d.get("field"))
                .and_then(Value::as_str),
            Some("description")
        );
    }

    #[actix_web::test]
    async fn creation_returns_the_stored_community() {
        let app = actix_test::init_service(test_app(HttpState::default())).await;
        let cookie = session_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/communities")
                .cookie(cookie)
                .set_json(&CreateCommunityRequest {
                    name: "Readers".into(),
                    description: "Book club".into(),
                    category: "Education".into(),
                    questions: "None".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);

        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("community JSON");
        assert_eq!(value.get("name").and_then(Value::as_str), Some("Readers"));
        assert_eq!(
            value.get("creator").and_then(Value::as_str),
            Some(crate::domain::ports::FIXTURE_UID)
        );
    }

    #[actix_web::test]
    async fn deletion_surfaces_forbidden_from_the_use_case() {
        let mut communities = MockCommunityCommand::new();
        communities.expect_delete().times(1).return_once(|_, _| {
            Err(Error::forbidden("only the creator may delete a community"))
        });
        let state = HttpState {
            communities: Arc::new(communities),
            ..HttpState::default()
        };

        let app = actix_test::init_service(test_app(state)).await;
        let cookie = session_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/api/v1/communities/c-1")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn deletion_reports_the_cascade() {
        let mut communities = MockCommunityCommand::new();
        communities.expect_delete().times(1).return_once(|_, id| {
            Ok(CascadeReport {
                community: id.clone(),
                detached: vec![UserId::new("u-2").expect("uid")],
                failures: Vec::new(),
            })
        });
        let state = HttpState {
            communities: Arc::new(communities),
            ..HttpState::default()
        };

        let app = actix_test::init_service(test_app(state)).await;
        let cookie = session_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/api/v1/communities/c-1")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert!(response.status().is_success());

        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("report JSON");
        assert_eq!(
            value.get("detached"),
            Some(&serde_json::json!(["u-2"]))
        );
    }
}
