//! Care-entry HTTP handlers: daily records, behaviour events and sleep logs
//! recorded against a patient.
//!
//! ```text
//! POST /api/v1/patients/{id}/daily-records {"notes":"Ate well"}
//! GET  /api/v1/patients/{id}/behavior-events
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde_json::Value;

use crate::domain::ports::CareWrite;
use crate::inbound::http::actor::ActingUser;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::schemas::{
    CareEntryBody, CareEntryKindSchema, CareRecordSchema, ErrorSchema, WriteTicketSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_document_id, parse_entry_kind};
use crate::inbound::http::{ApiResult, accepted};

const PATIENT_ID: FieldName = FieldName::new("patientId");
const KIND: FieldName = FieldName::new("kind");

/// Record a care entry for a patient.
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/{kind}",
    request_body = CareEntryBody,
    responses(
        (status = 202, description = "Write accepted; rejections are reported on the error event bus", body = WriteTicketSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema)
    ),
    params(
        ("id" = String, Path, description = "Patient id"),
        ("kind" = CareEntryKindSchema, Path, description = "Care entry kind")
    ),
    tags = ["patients"],
    operation_id = "logCareEntry"
)]
#[post("/patients/{id}/{kind:daily-records|behavior-events|sleep-logs}")]
pub async fn log_entry(
    state: web::Data<HttpState>,
    actor: ActingUser,
    path: web::Path<(String, String)>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let (patient, kind) = path.into_inner();
    let write = CareWrite::LogEntry {
        patient: parse_document_id(patient, PATIENT_ID)?,
        kind: parse_entry_kind(&kind, KIND)?,
        data: payload.into_inner(),
    };
    let ticket = state.care_records.submit(actor.into_inner(), write).await?;
    Ok(accepted(ticket))
}

/// List a patient's care entries of one kind.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/{kind}",
    responses(
        (status = 200, description = "Care entries", body = [CareRecordSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema),
        (status = 403, description = "Forbidden by store rules", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    params(
        ("id" = String, Path, description = "Patient id"),
        ("kind" = CareEntryKindSchema, Path, description = "Care entry kind")
    ),
    tags = ["patients"],
    operation_id = "listCareEntries"
)]
#[get("/patients/{id}/{kind:daily-records|behavior-events|sleep-logs}")]
pub async fn list_entries(
    state: web::Data<HttpState>,
    _actor: ActingUser,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (patient, kind) = path.into_inner();
    let patient = parse_document_id(patient, PATIENT_ID)?;
    let kind = parse_entry_kind(&kind, KIND)?;
    let entries = state.care_records_query.list_entries(patient, kind).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(entries))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::CareEntryKind;
    use crate::domain::ports::{MockCareRecordsCommand, MockCareRecordsQuery, WriteTicket};
    use crate::inbound::http::test_utils::{as_user, test_app};

    #[rstest]
    #[case("daily-records", CareEntryKind::DailyRecord)]
    #[case("behavior-events", CareEntryKind::BehaviorEvent)]
    #[case("sleep-logs", CareEntryKind::SleepLog)]
    #[actix_web::test]
    async fn log_entry_routes_by_kind(#[case] segment: &str, #[case] expected: CareEntryKind) {
        let mut command = MockCareRecordsCommand::new();
        command
            .expect_submit()
            .withf(move |_, write| {
                matches!(
                    write,
                    CareWrite::LogEntry { patient, kind, .. }
                        if patient.as_ref() == "p1" && *kind == expected
                )
            })
            .return_once(|_, _| Ok(WriteTicket::new("patients/p1/entries/e1")));
        let state = HttpState {
            care_records: Arc::new(command),
            ..HttpState::default()
        };
        let app = test::init_service(test_app(state)).await;

        let req = as_user(test::TestRequest::post().uri(&format!("/api/v1/patients/p1/{segment}")))
            .set_json(json!({ "notes": "Ate well" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::ACCEPTED);
    }

    #[actix_web::test]
    async fn unknown_kinds_do_not_match_a_route() {
        let app = test::init_service(test_app(HttpState::default())).await;

        let req = as_user(test::TestRequest::get().uri("/api/v1/patients/p1/meals")).to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn list_entries_queries_the_requested_kind() {
        let mut query = MockCareRecordsQuery::new();
        query
            .expect_list_entries()
            .withf(|patient, kind| patient.as_ref() == "p1" && *kind == CareEntryKind::SleepLog)
            .return_once(|_, _| Ok(Vec::new()));
        let state = HttpState {
            care_records_query: Arc::new(query),
            ..HttpState::default()
        };
        let app = test::init_service(test_app(state)).await;

        let req =
            as_user(test::TestRequest::get().uri("/api/v1/patients/p1/sleep-logs")).to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
    }
}
