//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`DocumentStore`, `LiveQuerySource`, `ReportAssistant`) are
//! implemented by outbound adapters. Driving ports (`*Command`, `*Query`) are
//! implemented by domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod care_records_command;
mod care_records_query;
mod document_store;
mod live_query_source;
mod notifications_command;
mod notifications_query;
mod report_assistant;
mod reports_command;
mod role_query;

#[cfg(test)]
pub use care_records_command::MockCareRecordsCommand;
pub use care_records_command::{
    CareRecordsCommand, CareWrite, FixtureCareRecordsCommand, WriteTicket,
};
#[cfg(test)]
pub use care_records_query::MockCareRecordsQuery;
pub use care_records_query::{CareRecordsQuery, FixtureCareRecordsQuery};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    BatchUpdate, Document, DocumentData, DocumentStore, DocumentStoreError, FixtureDocumentStore,
    SetMode,
};
#[cfg(test)]
pub use live_query_source::MockLiveQuerySource;
pub use live_query_source::{FixtureLiveQuerySource, LiveQuerySource};
#[cfg(test)]
pub use notifications_command::MockNotificationsCommand;
pub use notifications_command::{FixtureNotificationsCommand, NotificationsCommand};
#[cfg(test)]
pub use notifications_query::MockNotificationsQuery;
pub use notifications_query::{FixtureNotificationsQuery, NotificationsQuery};
#[cfg(test)]
pub use report_assistant::MockReportAssistant;
pub use report_assistant::{
    BehaviorAnalysis, BehaviorEventsInput, CareReportDraft, CareReportInput, DailyRecordsInput,
    DailyRecordsSummary, FixtureReportAssistant, ReportAssistant, ReportAssistantError,
    UnconfiguredReportAssistant,
};
#[cfg(test)]
pub use reports_command::MockReportsCommand;
pub use reports_command::{FixtureReportsCommand, ReportFlow, ReportOutput, ReportsCommand};
#[cfg(test)]
pub use role_query::MockRoleQuery;
pub use role_query::{FixtureRoleQuery, RoleQuery};
