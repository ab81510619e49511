//! Driving port for AI-assisted reports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{DocumentId, Error};

use super::{BehaviorAnalysis, CareReportDraft, DailyRecordsSummary};

/// Report flow to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFlow {
    /// Summarise daily records.
    DailySummary,
    /// Analyse behaviour events.
    BehaviorAnalysis,
    /// Draft a full care report.
    CareReport,
}

/// Result of a report flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "kebab-case")]
pub enum ReportOutput {
    /// Daily record summary.
    DailySummary(DailyRecordsSummary),
    /// Behaviour analysis.
    BehaviorAnalysis(BehaviorAnalysis),
    /// Care report draft.
    CareReport(CareReportDraft),
}

/// Driving port for generating reports about a patient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportsCommand: Send + Sync {
    /// Run `flow` over the stored records of `patient`.
    ///
    /// # Errors
    ///
    /// Assistant failures are reported as retryable
    /// [`crate::domain::ErrorCode::ServiceUnavailable`] errors.
    async fn generate(&self, patient: DocumentId, flow: ReportFlow) -> Result<ReportOutput, Error>;
}

/// Fixture command that reports the assistant as unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportsCommand;

#[async_trait]
impl ReportsCommand for FixtureReportsCommand {
    async fn generate(&self, _patient: DocumentId, _flow: ReportFlow) -> Result<ReportOutput, Error> {
        Err(Error::service_unavailable("report generation is not available"))
    }
}
