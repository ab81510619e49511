//! Role resolution HTTP handler.
//!
//! ```text
//! GET /api/v1/me/role
//! ```
//!
//! Anonymous callers are answered rather than rejected: they resolve to the
//! standard role with an `anonymous` basis.

use actix_web::{HttpResponse, get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::OptionalActingUser;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::schemas::RoleResolutionSchema;
use crate::inbound::http::state::HttpState;

/// Resolve the caller's role.
#[utoipa::path(
    get,
    path = "/api/v1/me/role",
    responses(
        (status = 200, description = "Resolved role; anonymous callers are standard", body = RoleResolutionSchema)
    ),
    tags = ["roles"],
    operation_id = "currentRole",
    security([])
)]
#[get("/me/role")]
pub async fn current_role(
    state: web::Data<HttpState>,
    actor: OptionalActingUser,
) -> ApiResult<HttpResponse> {
    let resolution = state.roles.resolve_role(actor.into_inner()).await;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(resolution))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::MockRoleQuery;
    use crate::domain::{Role, RoleBasis, RoleResolution};
    use crate::inbound::http::test_utils::{as_user, test_app};

    #[actix_web::test]
    async fn anonymous_callers_are_standard() {
        let app = test::init_service(test_app(HttpState::default())).await;

        let req = test::TestRequest::get().uri("/api/v1/me/role").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body,
            json!({ "role": "standard", "basis": { "kind": "anonymous" } })
        );
    }

    #[actix_web::test]
    async fn lookup_failures_are_reported_without_elevating() {
        let mut roles = MockRoleQuery::new();
        roles
            .expect_resolve_role()
            .withf(|user| user.is_some())
            .return_once(|_| RoleResolution {
                role: Role::Standard,
                basis: RoleBasis::LookupFailed {
                    message: "offline".into(),
                },
            });
        let state = HttpState {
            roles: Arc::new(roles),
            ..HttpState::default()
        };
        let app = test::init_service(test_app(state)).await;

        let req = as_user(test::TestRequest::get().uri("/api/v1/me/role")).to_request();
        let res = test::call_service(&app, req).await;

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["role"], "standard");
        assert_eq!(body["basis"]["kind"], "lookup_failed");
        assert_eq!(body["basis"]["message"], "offline");
    }
}
