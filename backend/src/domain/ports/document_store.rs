//! Port for the remote document store.
//!
//! The store is schemaless: every document is a JSON object addressed by a
//! [`DocumentPath`]. Security rules live in the store, so any operation may be
//! rejected with [`DocumentStoreError::PermissionDenied`]. Write callers go
//! through [`crate::domain::OptimisticWriter`] rather than this port directly.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{CollectionPath, DocumentPath};

use super::define_port_error;

/// JSON object stored as a document body.
pub type DocumentData = Map<String, Value>;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// Security rules rejected the operation.
        PermissionDenied {
            /// Reason reported by the store.
            message: String,
        } => "permission denied: {message}",
        /// The target document does not exist.
        NotFound {
            /// Path that was looked up.
            path: String,
        } => "document not found: {path}",
        /// A create targeted a document that already exists.
        AlreadyExists {
            /// Path that already holds a document.
            path: String,
        } => "document already exists: {path}",
        /// The store rejected the request shape.
        InvalidArgument {
            /// Reason reported by the store.
            message: String,
        } => "invalid document store request: {message}",
        /// The store could not be reached.
        Connection {
            /// Transport failure description.
            message: String,
        } => "document store connection failed: {message}",
        /// Any other store-side failure.
        Query {
            /// Failure description.
            message: String,
        } => "document store query failed: {message}",
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Location of the document.
    pub path: DocumentPath,
    /// Document body.
    pub data: DocumentData,
}

/// How [`DocumentStore::set`] treats an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetMode {
    /// Replace the whole body.
    #[default]
    Overwrite,
    /// Shallow-merge top-level fields into the existing body.
    Merge,
}

/// One patch applied atomically to many documents.
///
/// Either every document receives `patch` or none does.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchUpdate {
    /// Documents to update.
    pub documents: Vec<DocumentPath>,
    /// Fields merged into each document.
    pub patch: DocumentData,
}

impl BatchUpdate {
    /// Batch applying `patch` to each of `documents`.
    pub fn new(documents: Vec<DocumentPath>, patch: DocumentData) -> Self {
        Self { documents, patch }
    }

    /// Whether the batch touches no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Port for document reads and writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document, failing with
    /// [`DocumentStoreError::AlreadyExists`] if one is present.
    async fn create(&self, path: &DocumentPath, data: &DocumentData)
    -> Result<(), DocumentStoreError>;

    /// Write a document whether or not it exists.
    async fn set(
        &self,
        path: &DocumentPath,
        data: &DocumentData,
        mode: SetMode,
    ) -> Result<(), DocumentStoreError>;

    /// Shallow-merge `patch` into an existing document, failing with
    /// [`DocumentStoreError::NotFound`] if it is absent.
    async fn update(
        &self,
        path: &DocumentPath,
        patch: &DocumentData,
    ) -> Result<(), DocumentStoreError>;

    /// Delete a document. Deleting an absent document succeeds.
    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentStoreError>;

    /// Fetch a single document, returning `None` when it is absent.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentStoreError>;

    /// Fetch every document directly inside `collection`.
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, DocumentStoreError>;

    /// Apply a batch atomically. Every document must exist.
    async fn commit(&self, batch: &BatchUpdate) -> Result<(), DocumentStoreError>;
}

/// Fixture implementation for tests that do not inspect stored data.
///
/// Writes succeed and are discarded; reads find nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDocumentStore;

#[async_trait]
impl DocumentStore for FixtureDocumentStore {
    async fn create(
        &self,
        _path: &DocumentPath,
        _data: &DocumentData,
    ) -> Result<(), DocumentStoreError> {
        Ok(())
    }

    async fn set(
        &self,
        _path: &DocumentPath,
        _data: &DocumentData,
        _mode: SetMode,
    ) -> Result<(), DocumentStoreError> {
        Ok(())
    }

    async fn update(
        &self,
        _path: &DocumentPath,
        _patch: &DocumentData,
    ) -> Result<(), DocumentStoreError> {
        Ok(())
    }

    async fn delete(&self, _path: &DocumentPath) -> Result<(), DocumentStoreError> {
        Ok(())
    }

    async fn get(&self, _path: &DocumentPath) -> Result<Option<Document>, DocumentStoreError> {
        Ok(None)
    }

    async fn list(
        &self,
        _collection: &CollectionPath,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        Ok(Vec::new())
    }

    async fn commit(&self, _batch: &BatchUpdate) -> Result<(), DocumentStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::paths;
    use serde_json::json;

    fn data() -> DocumentData {
        json!({ "name": "Jane Doe" })
            .as_object()
            .cloned()
            .expect("object literal")
    }

    #[tokio::test]
    async fn fixture_store_accepts_writes_and_finds_nothing() {
        let store = FixtureDocumentStore;
        let path = paths::patients().doc(&crate::domain::DocumentId::generate());

        store.create(&path, &data()).await.expect("create");
        store
            .set(&path, &data(), SetMode::Merge)
            .await
            .expect("set");
        store.update(&path, &data()).await.expect("update");
        store.delete(&path).await.expect("delete");
        store
            .commit(&BatchUpdate::new(vec![path.clone()], data()))
            .await
            .expect("commit");
        assert!(store.get(&path).await.expect("get").is_none());
        assert!(store.list(&paths::patients()).await.expect("list").is_empty());
    }

    #[test]
    fn errors_render_their_context() {
        assert_eq!(
            DocumentStoreError::not_found("patients/p1").to_string(),
            "document not found: patients/p1"
        );
        assert_eq!(
            DocumentStoreError::permission_denied("rules").to_string(),
            "permission denied: rules"
        );
    }

    #[test]
    fn empty_batches_are_detected() {
        assert!(BatchUpdate::new(Vec::new(), DocumentData::new()).is_empty());
    }
}
