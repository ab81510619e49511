//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CareRecordsCommand, CareRecordsQuery, FixtureCareRecordsCommand, FixtureCareRecordsQuery,
    FixtureNotificationsCommand, FixtureNotificationsQuery, FixtureReportsCommand,
    FixtureRoleQuery, NotificationsCommand, NotificationsQuery, ReportsCommand, RoleQuery,
};

/// Dependency bundle for HTTP handlers.
///
/// `Default` wires every port to its fixture, which lets tests replace only
/// the port under test:
///
/// ```
/// use std::sync::Arc;
///
/// use carehub::domain::ports::FixtureRoleQuery;
/// use carehub::inbound::http::state::HttpState;
///
/// let state = HttpState {
///     roles: Arc::new(FixtureRoleQuery),
///     ..HttpState::default()
/// };
/// let _roles = state.roles.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    /// Patient, staff and care-entry writes.
    pub care_records: Arc<dyn CareRecordsCommand>,
    /// Patient, staff and care-entry reads.
    pub care_records_query: Arc<dyn CareRecordsQuery>,
    /// Read-state changes on the caller's notifications.
    pub notifications: Arc<dyn NotificationsCommand>,
    /// The caller's notification feed.
    pub notifications_query: Arc<dyn NotificationsQuery>,
    /// Role resolution for the caller.
    pub roles: Arc<dyn RoleQuery>,
    /// AI report flows.
    pub reports: Arc<dyn ReportsCommand>,
}

impl Default for HttpState {
    fn default() -> Self {
        Self {
            care_records: Arc::new(FixtureCareRecordsCommand),
            care_records_query: Arc::new(FixtureCareRecordsQuery),
            notifications: Arc::new(FixtureNotificationsCommand),
            notifications_query: Arc::new(FixtureNotificationsQuery),
            roles: Arc::new(FixtureRoleQuery),
            reports: Arc::new(FixtureReportsCommand),
        }
    }
}
