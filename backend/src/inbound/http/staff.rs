//! Staff roster HTTP handlers.
//!
//! ```text
//! POST   /api/v1/staff {"name":"Sam Carter","role":"nurse"}
//! GET    /api/v1/staff
//! PATCH  /api/v1/staff/{id}
//! DELETE /api/v1/staff/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde_json::Value;

use crate::domain::ports::CareWrite;
use crate::inbound::http::actor::ActingUser;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::schemas::{
    CareRecordSchema, ErrorSchema, NewRecordBody, RecordPatchBody, WriteTicketSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_document_id};
use crate::inbound::http::{ApiResult, accepted};

const STAFF_ID: FieldName = FieldName::new("staffId");

/// Register a staff member.
#[utoipa::path(
    post,
    path = "/api/v1/staff",
    request_body = NewRecordBody,
    responses(
        (status = 202, description = "Write accepted; rejections are reported on the error event bus", body = WriteTicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema)
    ),
    tags = ["staff"],
    operation_id = "registerStaff"
)]
#[post("/staff")]
pub async fn register_staff(
    state: web::Data<HttpState>,
    actor: ActingUser,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let write = CareWrite::RegisterStaff {
        data: payload.into_inner(),
    };
    let ticket = state.care_records.submit(actor.into_inner(), write).await?;
    Ok(accepted(ticket))
}

/// List every staff member.
#[utoipa::path(
    get,
    path = "/api/v1/staff",
    responses(
        (status = 200, description = "Staff members", body = [CareRecordSchema]),
        (status = 401, description = "Missing acting user", body = ErrorSchema),
        (status = 403, description = "Forbidden by store rules", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["staff"],
    operation_id = "listStaff"
)]
#[get("/staff")]
pub async fn list_staff(
    state: web::Data<HttpState>,
    _actor: ActingUser,
) -> ApiResult<HttpResponse> {
    let staff = state.care_records_query.list_staff().await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(staff))
}

/// Merge fields into a staff member.
#[utoipa::path(
    patch,
    path = "/api/v1/staff/{id}",
    request_body = RecordPatchBody,
    responses(
        (status = 202, description = "Write accepted; rejections are reported on the error event bus", body = WriteTicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema)
    ),
    params(
        ("id" = String, Path, description = "Staff member id")
    ),
    tags = ["staff"],
    operation_id = "updateStaff"
)]
#[patch("/staff/{id}")]
pub async fn update_staff(
    state: web::Data<HttpState>,
    actor: ActingUser,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(path.into_inner(), STAFF_ID)?;
    let write = CareWrite::UpdateStaff {
        id,
        patch: payload.into_inner(),
    };
    let ticket = state.care_records.submit(actor.into_inner(), write).await?;
    Ok(accepted(ticket))
}

/// Remove a staff member.
#[utoipa::path(
    delete,
    path = "/api/v1/staff/{id}",
    responses(
        (status = 202, description = "Write accepted; rejections are reported on the error event bus", body = WriteTicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema)
    ),
    params(
        ("id" = String, Path, description = "Staff member id")
    ),
    tags = ["staff"],
    operation_id = "removeStaff"
)]
#[delete("/staff/{id}")]
pub async fn remove_staff(
    state: web::Data<HttpState>,
    actor: ActingUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(path.into_inner(), STAFF_ID)?;
    let ticket = state
        .care_records
        .submit(actor.into_inner(), CareWrite::RemoveStaff { id })
        .await?;
    Ok(accepted(ticket))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::{MockCareRecordsCommand, WriteTicket};
    use crate::inbound::http::test_utils::{as_user, test_app};

    #[actix_web::test]
    async fn update_routes_the_patch_to_the_staff_member() {
        let mut command = MockCareRecordsCommand::new();
        command
            .expect_submit()
            .withf(|_, write| {
                matches!(
                    write,
                    CareWrite::UpdateStaff { id, patch }
                        if id.as_ref() == "s1" && *patch == json!({ "shift": "night" })
                )
            })
            .return_once(|_, _| Ok(WriteTicket::new("staff/s1")));
        let state = HttpState {
            care_records: Arc::new(command),
            ..HttpState::default()
        };
        let app = test::init_service(test_app(state)).await;

        let req = as_user(test::TestRequest::patch().uri("/api/v1/staff/s1"))
            .set_json(json!({ "shift": "night" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::ACCEPTED);
    }

    #[actix_web::test]
    async fn list_is_empty_for_the_fixture_facility() {
        let app = test::init_service(test_app(HttpState::default())).await;

        let req = as_user(test::TestRequest::get().uri("/api/v1/staff")).to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!([]));
    }
}
