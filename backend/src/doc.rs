//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes and the
//! adapter-side schema wrappers from [`crate::inbound::http::schemas`]. Swagger
//! UI serves it in debug builds; `cargo run --bin openapi-dump` prints it for
//! external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::actor::ACTING_USER_HEADER;
use crate::inbound::http::reports::ReportRequest;
use crate::inbound::http::schemas::{
    CareEntryBody, CareEntryKindSchema, CareRecordSchema, ErrorCodeSchema, ErrorSchema,
    NewRecordBody, NotificationSchema, RecordPatchBody, ReportFlowSchema, ReportOutputSchema,
    RoleBasisKind, RoleBasisSchema, RoleResolutionSchema, RoleSchema, WriteTicketSchema,
};

/// Enrich the generated document with the acting-user header scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ActingUser",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                ACTING_USER_HEADER,
                "Authenticated user id set by the upstream authentication proxy.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Carehub API",
        description = "Care-facility records, notifications and role lookups. \
            Writes are optimistic and answer 202 before the store confirms them."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("ActingUser" = [])),
    paths(
        crate::inbound::http::patients::register_patient,
        crate::inbound::http::patients::list_patients,
        crate::inbound::http::patients::get_patient,
        crate::inbound::http::patients::update_patient,
        crate::inbound::http::patients::remove_patient,
        crate::inbound::http::staff::register_staff,
        crate::inbound::http::staff::list_staff,
        crate::inbound::http::staff::update_staff,
        crate::inbound::http::staff::remove_staff,
        crate::inbound::http::care_entries::log_entry,
        crate::inbound::http::care_entries::list_entries,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_as_read,
        crate::inbound::http::notifications::mark_all_as_read,
        crate::inbound::http::roles::current_role,
        crate::inbound::http::reports::generate_report,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        WriteTicketSchema,
        CareRecordSchema,
        NewRecordBody,
        RecordPatchBody,
        CareEntryBody,
        CareEntryKindSchema,
        NotificationSchema,
        RoleSchema,
        RoleBasisKind,
        RoleBasisSchema,
        RoleResolutionSchema,
        ReportFlowSchema,
        ReportOutputSchema,
        ReportRequest,
    )),
    tags(
        (name = "patients", description = "Patient roster and care entries"),
        (name = "staff", description = "Staff roster"),
        (name = "notifications", description = "Per-user notification feed"),
        (name = "roles", description = "Role resolution"),
        (name = "reports", description = "AI-assisted report flows"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/patients")]
    #[case("/api/v1/patients/{id}")]
    #[case("/api/v1/patients/{id}/{kind}")]
    #[case("/api/v1/patients/{id}/reports")]
    #[case("/api/v1/staff")]
    #[case("/api/v1/notifications/read-all")]
    #[case("/api/v1/me/role")]
    #[case("/health/ready")]
    fn documents_every_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn error_schema_has_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("crate.domain.Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn acting_user_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("ActingUser"));
    }
}
