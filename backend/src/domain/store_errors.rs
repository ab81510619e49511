//! Mapping of read-path store failures onto domain errors.
//!
//! Write-path failures never pass through here; the optimistic write
//! pipeline publishes them as descriptors instead.

use crate::domain::Error;
use crate::domain::ports::DocumentStoreError;

pub(crate) fn map_store_error(error: DocumentStoreError) -> Error {
    match error {
        DocumentStoreError::PermissionDenied { message } => {
            Error::forbidden(format!("document store denied the read: {message}"))
        }
        DocumentStoreError::NotFound { path } => Error::not_found(format!("{path} not found")),
        DocumentStoreError::Connection { message } => {
            Error::service_unavailable(format!("document store unavailable: {message}"))
        }
        other => Error::internal(format!("document store error: {other}")),
    }
}
