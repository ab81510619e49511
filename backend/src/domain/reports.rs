//! AI-assisted report flows.
//!
//! The service gathers a patient's stored records, hands them to the
//! [`ReportAssistant`] and reports any assistant failure as a transient,
//! retryable error. It never writes to the store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::warn;

use crate::domain::ports::{
    BehaviorEventsInput, CareReportInput, DailyRecordsInput, Document, DocumentStore,
    ReportAssistant, ReportAssistantError, ReportFlow, ReportOutput, ReportsCommand,
};
use crate::domain::store_errors::map_store_error;
use crate::domain::{CareEntryKind, DocumentId, Error, paths};

/// Report service implementing [`ReportsCommand`].
pub struct ReportService<S: ?Sized, A: ?Sized> {
    store: Arc<S>,
    assistant: Arc<A>,
}

impl<S: ?Sized, A: ?Sized> ReportService<S, A> {
    /// Create a service reading from `store` and delegating to `assistant`.
    pub fn new(store: Arc<S>, assistant: Arc<A>) -> Self {
        Self { store, assistant }
    }
}

fn map_assistant_error(flow: ReportFlow, error: &ReportAssistantError) -> Error {
    warn!(flow = ?flow, error = %error, "report flow failed");
    Error::service_unavailable("report generation failed; please try again")
        .with_details(json!({ "retryable": true }))
}

fn bodies(documents: Vec<Document>) -> Vec<Value> {
    documents
        .into_iter()
        .map(|document| Value::Object(document.data))
        .collect()
}

impl<S, A> ReportService<S, A>
where
    S: DocumentStore + ?Sized,
    A: ReportAssistant + ?Sized,
{
    async fn patient(&self, id: &DocumentId) -> Result<(String, Value), Error> {
        let document = self
            .store
            .get(&paths::patient(id))
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("patient {id} not found")))?;
        let name = document
            .data
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Ok((name, Value::Object(document.data)))
    }

    async fn entries(&self, id: &DocumentId, kind: CareEntryKind) -> Result<Vec<Value>, Error> {
        let documents = self
            .store
            .list(&paths::care_entries(id, kind))
            .await
            .map_err(map_store_error)?;
        Ok(bodies(documents))
    }
}

#[async_trait]
impl<S, A> ReportsCommand for ReportService<S, A>
where
    S: DocumentStore + ?Sized,
    A: ReportAssistant + ?Sized,
{
    async fn generate(&self, patient: DocumentId, flow: ReportFlow) -> Result<ReportOutput, Error> {
        let (patient_name, body) = self.patient(&patient).await?;
        let output = match flow {
            ReportFlow::DailySummary => {
                let records = self.entries(&patient, CareEntryKind::DailyRecord).await?;
                self.assistant
                    .summarize_daily_records(DailyRecordsInput {
                        patient_name,
                        records,
                    })
                    .await
                    .map(ReportOutput::DailySummary)
            }
            ReportFlow::BehaviorAnalysis => {
                let events = self.entries(&patient, CareEntryKind::BehaviorEvent).await?;
                self.assistant
                    .analyze_behavior_events(BehaviorEventsInput {
                        patient_name,
                        events,
                    })
                    .await
                    .map(ReportOutput::BehaviorAnalysis)
            }
            ReportFlow::CareReport => {
                let input = CareReportInput {
                    patient_name,
                    patient: body,
                    daily_records: self.entries(&patient, CareEntryKind::DailyRecord).await?,
                    behavior_events: self.entries(&patient, CareEntryKind::BehaviorEvent).await?,
                    sleep_logs: self.entries(&patient, CareEntryKind::SleepLog).await?,
                };
                self.assistant
                    .draft_care_report(input)
                    .await
                    .map(ReportOutput::CareReport)
            }
        };
        output.map_err(|error| map_assistant_error(flow, &error))
    }
}
