//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic and do not derive `ToSchema`. The
//! wrappers here mirror their serialised shape for the generated document
//! and live in the inbound adapter, where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A dependency is temporarily unavailable; the caller may retry.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "patient not found")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, e.g. the offending field.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ports::WriteTicket`].
///
/// Returned with `202 Accepted`; the write completes after the response and
/// a rejection is reported on the error event bus.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::WriteTicket)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct WriteTicketSchema {
    /// Document or collection path the write targets.
    #[schema(example = "patients/8c1f0e2a9b7d4c3e8f6a5b4c3d2e1f00")]
    path: String,
}

/// OpenAPI schema for [`crate::domain::CareRecord`].
///
/// The stored fields are returned next to `id` as given when written.
#[derive(ToSchema)]
#[schema(as = crate::domain::CareRecord)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CareRecordSchema {
    /// Document id.
    #[schema(example = "p1")]
    id: String,
    /// Display name, present on patients and staff.
    #[schema(example = "Jane Doe")]
    name: Option<String>,
}

/// Body for registering a patient or staff member.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct NewRecordBody {
    /// Non-empty display name. Other fields are stored as given.
    #[schema(example = "Jane Doe")]
    name: String,
}

/// Body for merging fields into a patient or staff member.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RecordPatchBody {
    /// Replacement display name; must be non-empty when present.
    name: Option<String>,
    /// Example of an additional field.
    #[schema(example = "14A")]
    room: Option<String>,
}

/// Body for logging a care entry.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CareEntryBody {
    /// Free-text observation. Other fields are stored as given.
    #[schema(example = "Ate a full breakfast.")]
    notes: Option<String>,
}

/// OpenAPI schema for [`crate::domain::CareEntryKind`] route segments.
#[derive(ToSchema)]
#[schema(as = crate::domain::CareEntryKind)]
pub enum CareEntryKindSchema {
    /// Daily records.
    #[schema(rename = "daily-records")]
    DailyRecords,
    /// Behaviour events.
    #[schema(rename = "behavior-events")]
    BehaviorEvents,
    /// Sleep logs.
    #[schema(rename = "sleep-logs")]
    SleepLogs,
}

/// OpenAPI schema for [`crate::domain::Notification`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Notification)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct NotificationSchema {
    /// Document id within the caller's notifications.
    id: String,
    /// Short headline.
    #[schema(example = "New patient registered")]
    title: String,
    /// Longer text.
    description: String,
    /// In-app link.
    #[schema(example = "/patients/p1")]
    href: String,
    /// Creation instant (RFC 3339).
    #[schema(format = DateTime)]
    date: String,
    /// Whether the caller has seen it.
    read: bool,
}

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
pub enum RoleSchema {
    /// Administrative access.
    #[schema(rename = "elevated")]
    Elevated,
    /// Default access.
    #[schema(rename = "standard")]
    Standard,
}

/// Discriminator of [`crate::domain::RoleBasis`].
#[derive(ToSchema)]
pub enum RoleBasisKind {
    /// No caller identity.
    #[schema(rename = "anonymous")]
    Anonymous,
    /// The admin marker exists.
    #[schema(rename = "marker_present")]
    MarkerPresent,
    /// The admin marker does not exist.
    #[schema(rename = "marker_absent")]
    MarkerAbsent,
    /// The marker lookup failed; the role fell back to standard.
    #[schema(rename = "lookup_failed")]
    LookupFailed,
}

/// OpenAPI schema for [`crate::domain::RoleBasis`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RoleBasis)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RoleBasisSchema {
    /// Why the role was assigned.
    kind: RoleBasisKind,
    /// Store failure, present for `lookup_failed` only.
    message: Option<String>,
}

/// OpenAPI schema for [`crate::domain::RoleResolution`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RoleResolution)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RoleResolutionSchema {
    /// Assigned role.
    role: RoleSchema,
    /// Reason for the assignment.
    basis: RoleBasisSchema,
}

/// OpenAPI schema for [`crate::domain::ports::ReportFlow`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::ReportFlow)]
pub enum ReportFlowSchema {
    /// Summarise daily records.
    #[schema(rename = "daily-summary")]
    DailySummary,
    /// Analyse behaviour events.
    #[schema(rename = "behavior-analysis")]
    BehaviorAnalysis,
    /// Draft a full care report.
    #[schema(rename = "care-report")]
    CareReport,
}

/// OpenAPI schema for [`crate::domain::ports::ReportOutput`].
///
/// Tagged by `flow`; the remaining fields depend on the flow that ran.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::ReportOutput)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ReportOutputSchema {
    /// Flow that produced the output.
    flow: ReportFlowSchema,
}
