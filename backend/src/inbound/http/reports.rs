//! AI report flow HTTP handler.
//!
//! ```text
//! POST /api/v1/patients/{id}/reports {"flow":"daily-summary"}
//! ```
//!
//! Flows: `daily-summary`, `behavior-analysis`, `care-report`. Assistant
//! failures answer `503` with `details.retryable = true`.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ReportFlow;
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::ActingUser;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::schemas::{ErrorSchema, ReportFlowSchema, ReportOutputSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_document_id};

/// Request body for `POST /api/v1/patients/{id}/reports`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReportRequest {
    /// Flow to run.
    #[schema(value_type = ReportFlowSchema)]
    pub flow: ReportFlow,
}

/// Run a report flow for a patient.
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/reports",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report output", body = ReportOutputSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing acting user", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Assistant unavailable; retryable", body = ErrorSchema)
    ),
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    tags = ["reports"],
    operation_id = "generateReport"
)]
#[post("/patients/{id}/reports")]
pub async fn generate_report(
    state: web::Data<HttpState>,
    _actor: ActingUser,
    path: web::Path<String>,
    payload: web::Json<ReportRequest>,
) -> ApiResult<HttpResponse> {
    let patient = parse_document_id(path.into_inner(), FieldName::new("patientId"))?;
    let output = state
        .reports
        .generate(patient, payload.into_inner().flow)
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(output))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{DailyRecordsSummary, MockReportsCommand, ReportOutput};
    use crate::inbound::http::test_utils::{as_user, test_app};

    #[actix_web::test]
    async fn returns_the_flow_output() {
        let mut reports = MockReportsCommand::new();
        reports
            .expect_generate()
            .withf(|patient, flow| patient.as_ref() == "p1" && *flow == ReportFlow::DailySummary)
            .return_once(|_, _| {
                Ok(ReportOutput::DailySummary(DailyRecordsSummary {
                    summary: "Settled day".into(),
                }))
            });
        let state = HttpState {
            reports: Arc::new(reports),
            ..HttpState::default()
        };
        let app = test::init_service(test_app(state)).await;

        let req = as_user(test::TestRequest::post().uri("/api/v1/patients/p1/reports"))
            .set_json(json!({ "flow": "daily-summary" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["flow"], "daily-summary");
        assert_eq!(body["summary"], "Settled day");
    }

    #[actix_web::test]
    async fn unavailable_assistant_is_service_unavailable() {
        let app = test::init_service(test_app(HttpState::default())).await;

        let req = as_user(test::TestRequest::post().uri("/api/v1/patients/p1/reports"))
            .set_json(json!({ "flow": "care-report" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn unknown_flow_is_bad_request() {
        let app = test::init_service(test_app(HttpState::default())).await;

        let req = as_user(test::TestRequest::post().uri("/api/v1/patients/p1/reports"))
            .set_json(json!({ "flow": "horoscope" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
