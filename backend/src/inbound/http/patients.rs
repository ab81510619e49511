//! Patient roster HTTP handlers.
//!
//! ```text
//! POST   /api/v1/patients {"name":"Jane Doe","room":"12B"}
//! GET    /api/v1/patients
//! GET    /api/v1/patients/{id}
//! PATCH  /api/v1/patients/{id} {"room":"14A"}
//! DELETE /api/v1/patients/{id}
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

const PATIENT_ID: FieldName = FieldName::new("patientId");

/// Register a patient. Answers `202` with the new document path.
#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = NewRecordBody,
    responses(
        (status = 202, description = "Write accepted; rejections are reported on the error event bus", body = WriteTicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "registerPatient"
)]
#[post("/patients")]
pub async fn register_patient(
    state: web::Data<HttpState>,
    actor: ActingUser,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let write = CareWrite::RegisterPatient {
        data: payload.into_inner(),
    };
    let ticket = state.care_records.submit(actor.into_inner(), write).await?;
    Ok(accepted(ticket))
}

/// List every patient.
#[utoipa::path(
    get,
    path = "/api/v1/patients",
    responses(
        (status = 200, description = "Patients", body = [CareRecordSchema]),
        (status = 401, description = "Missing acting user", body = ErrorSchema),
        (status = 403, description = "Forbidden by store rules", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "listPatients"
)]
#[get("/patients")]
pub async fn list_patients(
    state: web::Data<HttpState>,
    _actor: ActingUser,
) -> ApiResult<HttpResponse> {
    let patients = state.care_records_query.list_patients().await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(patients))
}

/// Fetch one patient.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}",
    responses(
        (status = 200, description = "Patient", body = CareRecordSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    tags = ["patients"],
    operation_id = "getPatient"
)]
#[get("/patients/{id}")]
pub async fn get_patient(
    state: web::Data<HttpState>,
    _actor: ActingUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(path.into_inner(), PATIENT_ID)?;
    let patient = state.care_records_query.find_patient(id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(patient))
}

/// Merge fields into a patient.
#[utoipa::path(
    patch,
    path = "/api/v1/patients/{id}",
    request_body = RecordPatchBody,
    responses(
        (status = 202, description = "Write accepted; rejections are reported on the error event bus", body = WriteTicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema)
    ),
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    tags = ["patients"],
    operation_id = "updatePatient"
)]
#[patch("/patients/{id}")]
pub async fn update_patient(
    state: web::Data<HttpState>,
    actor: ActingUser,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(path.into_inner(), PATIENT_ID)?;
    let write = CareWrite::UpdatePatient {
        id,
        patch: payload.into_inner(),
    };
    let ticket = state.care_records.submit(actor.into_inner(), write).await?;
    Ok(accepted(ticket))
}

/// Remove a patient.
#[utoipa::path(
    delete,
    path = "/api/v1/patients/{id}",
    responses(
        (status = 202, description = "Write accepted; rejections are reported on the error event bus", body = WriteTicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema)
    ),
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    tags = ["patients"],
    operation_id = "removePatient"
)]
#[delete("/patients/{id}")]
pub async fn remove_patient(
    state: web::Data<HttpState>,
    actor: ActingUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(path.into_inner(), PATIENT_ID)?;
    let ticket = state
        .care_records
        .submit(actor.into_inner(), CareWrite::RemovePatient { id })
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
    use crate::domain::ports::{MockCareRecordsCommand, MockCareRecordsQuery, WriteTicket};
    use crate::domain::{CareRecord, Error};
    use crate::inbound::http::test_utils::{NURSE, as_user, test_app};

    #[actix_web::test]
    async fn register_answers_accepted_with_the_target_path() {
        let mut command = MockCareRecordsCommand::new();
        command
            .expect_submit()
            .withf(|actor, write| {
                actor.as_ref() == NURSE
                    && *write
                        == CareWrite::RegisterPatient {
                            data: json!({ "name": "Jane Doe" }),
                        }
            })
            .times(1)
            .return_once(|_, _| Ok(WriteTicket::new("patients/p1")));
        let state = HttpState {
            care_records: Arc::new(command),
            ..HttpState::default()
        };
        let app = test::init_service(test_app(state)).await;

        let req = as_user(test::TestRequest::post().uri("/api/v1/patients"))
            .set_json(json!({ "name": "Jane Doe" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::ACCEPTED);
        let body: WriteTicket = test::read_body_json(res).await;
        assert_eq!(body.path, "patients/p1");
    }

    #[actix_web::test]
    async fn validation_failures_surface_as_bad_request() {
        let mut command = MockCareRecordsCommand::new();
        command
            .expect_submit()
            .return_once(|_, _| Err(Error::invalid_request("name must not be empty")));
        let state = HttpState {
            care_records: Arc::new(command),
            ..HttpState::default()
        };
        let app = test::init_service(test_app(state)).await;

        let req = as_user(test::TestRequest::post().uri("/api/v1/patients"))
            .set_json(json!({}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn malformed_json_is_bad_request() {
        let app = test::init_service(test_app(HttpState::default())).await;

        let req = as_user(test::TestRequest::post().uri("/api/v1/patients"))
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Error = test::read_body_json(res).await;
        assert_eq!(body.details().expect("details")["code"], "invalid_json");
    }

    #[actix_web::test]
    async fn writes_require_an_acting_user() {
        let app = test::init_service(test_app(HttpState::default())).await;

        let req = test::TestRequest::delete()
            .uri("/api/v1/patients/p1")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn get_patient_returns_flattened_record() {
        let mut query = MockCareRecordsQuery::new();
        query
            .expect_find_patient()
            .withf(|id| id.as_ref() == "p1")
            .return_once(|_| {
                let mut data = serde_json::Map::new();
                data.insert("name".into(), json!("Jane Doe"));
                Ok(CareRecord {
                    id: "p1".into(),
                    data,
                })
            });
        let state = HttpState {
            care_records_query: Arc::new(query),
            ..HttpState::default()
        };
        let app = test::init_service(test_app(state)).await;

        let req = as_user(test::TestRequest::get().uri("/api/v1/patients/p1")).to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get("cache-control").map(|v| v.as_bytes()),
            Some(&b"private, no-store"[..])
        );
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({ "id": "p1", "name": "Jane Doe" }));
    }

    #[actix_web::test]
    async fn missing_patient_is_not_found() {
        let app = test::init_service(test_app(HttpState::default())).await;

        let req = as_user(test::TestRequest::get().uri("/api/v1/patients/ghost")).to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
