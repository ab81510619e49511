//! Domain primitives, services and ports.
//!
//! Purpose: Define the care-facility core independent of transport and
//! storage. Writes flow through the optimistic write pipeline; rejected
//! writes become permission error descriptors on the error event bus. Reads
//! flow through live queries or the query ports.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - ErrorEventBus / PermissionErrorDescriptor: failure side channel.
//! - OptimisticWriter / WriteRequest / WriteOutcome: the write pipeline.
//! - RoleResolver / RoleService: admin marker lookups.
//! - LiveQuery / Snapshot: read subscriptions.
//! - NotificationService, CareRecordsService, ReportService: driving port
//!   implementations.

pub mod care_records;
pub mod error;
pub mod error_events;
pub mod live_query;
pub mod notifications;
pub mod paths;
pub mod permission_error;
pub mod ports;
pub mod reports;
pub mod roles;
mod store_errors;
pub mod trace_id;
pub mod user;
pub mod write_pipeline;

pub use self::care_records::{CareEntryKind, CareRecord, CareRecordsService, UnknownCareEntryKind};
pub use self::error::{Error, ErrorCode};
pub use self::error_events::{ErrorEventBus, ErrorEventName, Subscription};
pub use self::live_query::{LiveQuery, Snapshot};
pub use self::notifications::{NewNotification, Notification, NotificationService};
pub use self::paths::{CollectionPath, DocumentId, DocumentPath, PathValidationError};
pub use self::permission_error::{PermissionErrorDescriptor, StoreOperation};
pub use self::reports::ReportService;
pub use self::roles::{Role, RoleBasis, RoleResolution, RoleResolver, RoleService, RoleState};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{UserId, UserValidationError};
pub use self::write_pipeline::{OptimisticWriter, WriteOutcome, WriteRequest};
