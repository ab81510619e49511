//! Driving port for care-record reads.

use async_trait::async_trait;

use crate::domain::{CareEntryKind, CareRecord, DocumentId, Error};

/// Driving port for reading patients, staff and care entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CareRecordsQuery: Send + Sync {
    /// Every patient on the roster.
    async fn list_patients(&self) -> Result<Vec<CareRecord>, Error>;

    /// A single patient.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::NotFound`] when the patient does
    /// not exist.
    async fn find_patient(&self, id: DocumentId) -> Result<CareRecord, Error>;

    /// Every staff member.
    async fn list_staff(&self) -> Result<Vec<CareRecord>, Error>;

    /// Entries of `kind` recorded for `patient`.
    async fn list_entries(
        &self,
        patient: DocumentId,
        kind: CareEntryKind,
    ) -> Result<Vec<CareRecord>, Error>;
}

/// Fixture query that reports an empty facility.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCareRecordsQuery;

#[async_trait]
impl CareRecordsQuery for FixtureCareRecordsQuery {
    async fn list_patients(&self) -> Result<Vec<CareRecord>, Error> {
        Ok(Vec::new())
    }

    async fn find_patient(&self, id: DocumentId) -> Result<CareRecord, Error> {
        Err(Error::not_found(format!("patient {id} not found")))
    }

    async fn list_staff(&self) -> Result<Vec<CareRecord>, Error> {
        Ok(Vec::new())
    }

    async fn list_entries(
        &self,
        _patient: DocumentId,
        _kind: CareEntryKind,
    ) -> Result<Vec<CareRecord>, Error> {
        Ok(Vec::new())
    }
}
