//! Port for the generative-AI report flows.
//!
//! Three request/response flows are delegated to an external assistant.
//! Prompt construction and output wording belong to the assistant; this
//! crate only defines the structured inputs and outputs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::define_port_error;

define_port_error! {
    /// Errors raised by report assistant adapters.
    pub enum ReportAssistantError {
        /// The assistant could not be reached or is not configured.
        Unavailable {
            /// Failure description.
            message: String,
        } => "report assistant unavailable: {message}",
        /// The assistant answered with output that does not fit the flow.
        InvalidResponse {
            /// Failure description.
            message: String,
        } => "report assistant returned an invalid response: {message}",
    }
}

/// Input for [`ReportAssistant::summarize_daily_records`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecordsInput {
    /// Patient display name.
    pub patient_name: String,
    /// Daily record bodies, oldest first.
    pub records: Vec<Value>,
}

/// Output of [`ReportAssistant::summarize_daily_records`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecordsSummary {
    /// Narrative summary.
    pub summary: String,
}

/// Input for [`ReportAssistant::analyze_behavior_events`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorEventsInput {
    /// Patient display name.
    pub patient_name: String,
    /// Behaviour event bodies, oldest first.
    pub events: Vec<Value>,
}

/// Output of [`ReportAssistant::analyze_behavior_events`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorAnalysis {
    /// Patterns the assistant noticed.
    pub patterns: Vec<String>,
    /// Suggested follow-ups.
    pub recommendations: Vec<String>,
}

/// Input for [`ReportAssistant::draft_care_report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareReportInput {
    /// Patient display name.
    pub patient_name: String,
    /// Patient body as stored.
    pub patient: Value,
    /// Daily records, oldest first.
    pub daily_records: Vec<Value>,
    /// Behaviour events, oldest first.
    pub behavior_events: Vec<Value>,
    /// Sleep logs, oldest first.
    pub sleep_logs: Vec<Value>,
}

/// Output of [`ReportAssistant::draft_care_report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareReportDraft {
    /// Report body.
    pub report: String,
}

/// Port for the external report assistant.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportAssistant: Send + Sync {
    /// Summarise a patient's daily records.
    async fn summarize_daily_records(
        &self,
        input: DailyRecordsInput,
    ) -> Result<DailyRecordsSummary, ReportAssistantError>;

    /// Look for patterns in a patient's behaviour events.
    async fn analyze_behavior_events(
        &self,
        input: BehaviorEventsInput,
    ) -> Result<BehaviorAnalysis, ReportAssistantError>;

    /// Draft a full care report.
    async fn draft_care_report(
        &self,
        input: CareReportInput,
    ) -> Result<CareReportDraft, ReportAssistantError>;
}

/// Deterministic assistant that describes its input instead of calling a
/// model.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportAssistant;

#[async_trait]
impl ReportAssistant for FixtureReportAssistant {
    async fn summarize_daily_records(
        &self,
        input: DailyRecordsInput,
    ) -> Result<DailyRecordsSummary, ReportAssistantError> {
        Ok(DailyRecordsSummary {
            summary: format!(
                "{} daily records for {}",
                input.records.len(),
                input.patient_name
            ),
        })
    }

    async fn analyze_behavior_events(
        &self,
        input: BehaviorEventsInput,
    ) -> Result<BehaviorAnalysis, ReportAssistantError> {
        Ok(BehaviorAnalysis {
            patterns: vec![format!(
                "{} behavior events for {}",
                input.events.len(),
                input.patient_name
            )],
            recommendations: Vec::new(),
        })
    }

    async fn draft_care_report(
        &self,
        input: CareReportInput,
    ) -> Result<CareReportDraft, ReportAssistantError> {
        Ok(CareReportDraft {
            report: format!(
                "Care report for {}: {} daily records, {} behavior events, {} sleep logs",
                input.patient_name,
                input.daily_records.len(),
                input.behavior_events.len(),
                input.sleep_logs.len()
            ),
        })
    }
}

/// Assistant used when no model backend is configured; every flow fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredReportAssistant;

impl UnconfiguredReportAssistant {
    fn unavailable() -> ReportAssistantError {
        ReportAssistantError::unavailable("no report assistant is configured")
    }
}

#[async_trait]
impl ReportAssistant for UnconfiguredReportAssistant {
    async fn summarize_daily_records(
        &self,
        _input: DailyRecordsInput,
    ) -> Result<DailyRecordsSummary, ReportAssistantError> {
        Err(Self::unavailable())
    }

    async fn analyze_behavior_events(
        &self,
        _input: BehaviorEventsInput,
    ) -> Result<BehaviorAnalysis, ReportAssistantError> {
        Err(Self::unavailable())
    }

    async fn draft_care_report(
        &self,
        _input: CareReportInput,
    ) -> Result<CareReportDraft, ReportAssistantError> {
        Err(Self::unavailable())
    }
}
