//! Builders wiring the document store into the domain services behind the
//! HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use carehub::domain::ports::{DocumentStore, ReportAssistant, UnconfiguredReportAssistant};
use carehub::domain::{
    CareRecordsService, ErrorEventBus, NotificationService, ReportService, RoleService,
};
use carehub::inbound::http::state::HttpState;
use carehub::outbound::firestore::FirestoreRestStore;
use carehub::outbound::memory::InMemoryDocumentStore;

use super::StoreConfig;
use super::token::token_fingerprint;

/// Build the configured document store.
///
/// # Errors
/// Returns [`std::io::Error`] when the Firestore client cannot be built.
pub(crate) fn build_store(config: StoreConfig) -> std::io::Result<Arc<dyn DocumentStore>> {
    match config {
        StoreConfig::Memory => {
            info!("using in-memory document store; data is lost on restart");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        StoreConfig::Firestore(firestore) => {
            let token_fingerprint = firestore.token.as_deref().map(|token| token_fingerprint(token));
            info!(
                project_id = %firestore.project_id,
                database = %firestore.database,
                endpoint = %firestore.endpoint,
                token_fingerprint = ?token_fingerprint,
                "using firestore document store"
            );
            let store = FirestoreRestStore::new(firestore).map_err(|error| {
                std::io::Error::other(format!("firestore store setup failed: {error}"))
            })?;
            Ok(Arc::new(store))
        }
    }
}

/// Wire every driving port over `store`, reporting rejected writes on `bus`.
pub(crate) fn build_http_state(store: &Arc<dyn DocumentStore>, bus: &ErrorEventBus) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let care_records = Arc::new(CareRecordsService::new(
        Arc::clone(store),
        bus.clone(),
        Arc::clone(&clock),
    ));
    let notifications = Arc::new(NotificationService::new(Arc::clone(store), bus.clone(), clock));
    let assistant: Arc<dyn ReportAssistant> = Arc::new(UnconfiguredReportAssistant);

    HttpState {
        care_records: care_records.clone(),
        care_records_query: care_records,
        notifications: notifications.clone(),
        notifications_query: notifications,
        roles: Arc::new(RoleService::new(Arc::clone(store))),
        reports: Arc::new(ReportService::new(Arc::clone(store), assistant)),
    }
}
