//! Patient, staff and care-entry records.
//!
//! Writes are planned synchronously (validation, id generation, timestamps)
//! and then executed through the [`OptimisticWriter`]. A successful
//! registration or behaviour event notifies the acting user.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use mockable::Clock;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{
    CareRecordsCommand, CareRecordsQuery, CareWrite, Document, DocumentData, DocumentStore,
    WriteTicket,
};
use crate::domain::store_errors::map_store_error;
use crate::domain::write_pipeline::spawn_traced;
use crate::domain::{
    CollectionPath, DocumentId, Error, ErrorEventBus, NewNotification, NotificationService,
    OptimisticWriter, UserId, WriteOutcome, WriteRequest, paths,
};

/// Kind of care entry recorded under a patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CareEntryKind {
    /// Daily care record.
    DailyRecord,
    /// Behaviour event.
    BehaviorEvent,
    /// Sleep log.
    SleepLog,
}

impl CareEntryKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 3] = [Self::DailyRecord, Self::BehaviorEvent, Self::SleepLog];

    /// Sub-collection name under `patients/{id}`.
    pub fn collection_name(self) -> &'static str {
        match self {
            Self::DailyRecord => "dailyRecords",
            Self::BehaviorEvent => "behaviorEvents",
            Self::SleepLog => "sleepLogs",
        }
    }

    /// URL segment used by in-app links and the HTTP API.
    pub fn route_segment(self) -> &'static str {
        match self {
            Self::DailyRecord => "daily-records",
            Self::BehaviorEvent => "behavior-events",
            Self::SleepLog => "sleep-logs",
        }
    }
}

impl fmt::Display for CareEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_segment())
    }
}

/// Error returned when a URL segment names no care entry kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown care entry kind: {0}")]
pub struct UnknownCareEntryKind(pub String);

impl FromStr for CareEntryKind {
    type Err = UnknownCareEntryKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.route_segment() == s)
            .ok_or_else(|| UnknownCareEntryKind(s.to_owned()))
    }
}

/// A stored record with its id lifted next to its fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareRecord {
    /// Document id.
    pub id: String,
    /// Document body.
    #[serde(flatten)]
    pub data: DocumentData,
}

impl From<Document> for CareRecord {
    fn from(document: Document) -> Self {
        let mut data = document.data;
        data.remove(RESERVED_ID_FIELD);
        Self {
            id: document.path.id().to_owned(),
            data,
        }
    }
}

/// A validated write plus the notification to send when it lands.
#[derive(Debug, Clone, PartialEq)]
struct PlannedWrite {
    request: WriteRequest,
    notification: Option<NewNotification>,
}

/// Field name the document id is lifted into; bodies may not carry it.
const RESERVED_ID_FIELD: &str = "id";

fn into_object(value: Value, what: &str) -> Result<DocumentData, Error> {
    match value {
        Value::Object(data) if data.contains_key(RESERVED_ID_FIELD) => Err(Error::invalid_request(
            format!("{what} must not set {RESERVED_ID_FIELD}; ids are assigned by the store"),
        )),
        Value::Object(data) => Ok(data),
        _ => Err(Error::invalid_request(format!("{what} must be a JSON object"))),
    }
}

fn required_name(data: &DocumentData, what: &str) -> Result<String, Error> {
    match data.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => Ok(name.clone()),
        _ => Err(Error::invalid_request(format!("{what} name must be a non-empty string"))),
    }
}

fn validated_patch(value: Value, what: &str) -> Result<DocumentData, Error> {
    let patch = into_object(value, what)?;
    if patch.is_empty() {
        return Err(Error::invalid_request(format!("{what} must not be empty")));
    }
    if patch.contains_key("name") {
        required_name(&patch, what)?;
    }
    Ok(patch)
}

/// Care-record service implementing the care-record driving ports.
pub struct CareRecordsService<S: ?Sized> {
    writer: OptimisticWriter<S>,
    store: Arc<S>,
    notifications: NotificationService<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> Clone for CareRecordsService<S> {
    fn clone(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            store: Arc::clone(&self.store),
            notifications: self.notifications.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: ?Sized> CareRecordsService<S> {
    /// Create a service writing through `store` and reporting failures on
    /// `bus`.
    pub fn new(store: Arc<S>, bus: ErrorEventBus, clock: Arc<dyn Clock>) -> Self {
        Self {
            writer: OptimisticWriter::new(Arc::clone(&store), bus.clone()),
            notifications: NotificationService::new(Arc::clone(&store), bus, Arc::clone(&clock)),
            store,
            clock,
        }
    }

    fn plan(&self, actor: &UserId, write: CareWrite) -> Result<PlannedWrite, Error> {
        let planned = match write {
            CareWrite::RegisterPatient { data } => {
                let data = into_object(data, "patient")?;
                let name = required_name(&data, "patient")?;
                let id = DocumentId::generate();
                PlannedWrite {
                    notification: Some(NewNotification::new(
                        "New patient registered",
                        format!("{name} was added to the patient roster."),
                        format!("/patients/{id}"),
                    )?),
                    request: WriteRequest::Create {
                        path: paths::patient(&id),
                        data,
                    },
                }
            }
            CareWrite::UpdatePatient { id, patch } => PlannedWrite {
                request: WriteRequest::Update {
                    path: paths::patient(&id),
                    patch: validated_patch(patch, "patient update")?,
                },
                notification: None,
            },
            CareWrite::RemovePatient { id } => PlannedWrite {
                request: WriteRequest::Delete {
                    path: paths::patient(&id),
                },
                notification: None,
            },
            CareWrite::RegisterStaff { data } => {
                let data = into_object(data, "staff member")?;
                let name = required_name(&data, "staff member")?;
                let id = DocumentId::generate();
                PlannedWrite {
                    notification: Some(NewNotification::new(
                        "New staff member",
                        format!("{name} joined the team."),
                        format!("/staff/{id}"),
                    )?),
                    request: WriteRequest::Create {
                        path: paths::staff_member(&id),
                        data,
                    },
                }
            }
            CareWrite::UpdateStaff { id, patch } => PlannedWrite {
                request: WriteRequest::Update {
                    path: paths::staff_member(&id),
                    patch: validated_patch(patch, "staff update")?,
                },
                notification: None,
            },
            CareWrite::RemoveStaff { id } => PlannedWrite {
                request: WriteRequest::Delete {
                    path: paths::staff_member(&id),
                },
                notification: None,
            },
            CareWrite::LogEntry {
                patient,
                kind,
                data,
            } => self.plan_entry(actor, &patient, kind, data)?,
        };
        Ok(planned)
    }

    fn plan_entry(
        &self,
        actor: &UserId,
        patient: &DocumentId,
        kind: CareEntryKind,
        data: Value,
    ) -> Result<PlannedWrite, Error> {
        let mut data = into_object(data, "care entry")?;
        data.entry("recordedAt").or_insert_with(|| {
            Value::String(self.clock.utc().to_rfc3339_opts(SecondsFormat::Millis, true))
        });
        data.entry("recordedBy")
            .or_insert_with(|| Value::String(actor.to_string()));
        let id = DocumentId::generate();
        let notification = match kind {
            CareEntryKind::BehaviorEvent => Some(NewNotification::new(
                "Behavior event logged",
                "A new behavior event was recorded.",
                format!("/patients/{patient}/{}/{id}", kind.route_segment()),
            )?),
            CareEntryKind::DailyRecord | CareEntryKind::SleepLog => None,
        };
        Ok(PlannedWrite {
            request: WriteRequest::Create {
                path: paths::care_entries(patient, kind).doc(&id),
                data,
            },
            notification,
        })
    }
}

impl<S> CareRecordsService<S>
where
    S: DocumentStore + ?Sized,
{
    /// Validate and perform `write`, waiting for the store.
    ///
    /// # Errors
    ///
    /// Only validation failures are returned as errors. A rejected write is
    /// reported through the returned [`WriteOutcome`] and the error event bus.
    pub async fn perform(&self, actor: &UserId, write: CareWrite) -> Result<WriteOutcome<String>, Error> {
        let planned = self.plan(actor, write)?;
        Ok(self.execute(actor, planned).await)
    }

    async fn execute(&self, actor: &UserId, planned: PlannedWrite) -> WriteOutcome<String> {
        let target = planned.request.target();
        let outcome = self.writer.apply(planned.request, || {}).await;
        if let (true, Some(draft)) = (outcome.is_applied(), planned.notification) {
            let notified = self.notifications.notify(actor, draft).await.is_applied();
            debug!(user = %actor, notified, "success notification issued");
        }
        outcome.map(|()| target)
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<CareRecord>, Error> {
        let documents = self.store.list(collection).await.map_err(map_store_error)?;
        Ok(documents.into_iter().map(CareRecord::from).collect())
    }
}

#[async_trait]
impl<S> CareRecordsCommand for CareRecordsService<S>
where
    S: DocumentStore + ?Sized + 'static,
{
    async fn submit(&self, actor: UserId, write: CareWrite) -> Result<WriteTicket, Error> {
        let planned = self.plan(&actor, write)?;
        let ticket = WriteTicket::new(planned.request.target());
        let service = self.clone();
        spawn_traced(async move {
            let applied = service.execute(&actor, planned).await.is_applied();
            debug!(user = %actor, applied, "care record write settled");
        });
        Ok(ticket)
    }
}

#[async_trait]
impl<S> CareRecordsQuery for CareRecordsService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn list_patients(&self) -> Result<Vec<CareRecord>, Error> {
        self.list(&paths::patients()).await
    }

    async fn find_patient(&self, id: DocumentId) -> Result<CareRecord, Error> {
        self.store
            .get(&paths::patient(&id))
            .await
            .map_err(map_store_error)?
            .map(CareRecord::from)
            .ok_or_else(|| Error::not_found(format!("patient {id} not found")))
    }

    async fn list_staff(&self) -> Result<Vec<CareRecord>, Error> {
        self.list(&paths::staff()).await
    }

    async fn list_entries(
        &self,
        patient: DocumentId,
        kind: CareEntryKind,
    ) -> Result<Vec<CareRecord>, Error> {
        self.list(&paths::care_entries(&patient, kind)).await
    }
}
