//! Optimistic write pipeline.
//!
//! Every document-store mutation goes through [`OptimisticWriter`]. It issues
//! the write, runs the caller's success continuation once the store
//! acknowledges it, and otherwise turns the failure into a
//! [`PermissionErrorDescriptor`] published on the [`ErrorEventBus`]. Failures
//! are never returned as errors: callers that care inspect the
//! [`WriteOutcome`], everyone else fires and forgets.
//!
//! Writes are not retried here.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::ports::{BatchUpdate, DocumentData, DocumentStore, DocumentStoreError};
use crate::domain::{
    CollectionPath, DocumentId, DocumentPath, ErrorEventBus, ErrorEventName,
    PermissionErrorDescriptor, StoreOperation, TraceId,
};

/// A single mutation: target, operation and payload.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRequest {
    /// Create a new document.
    Create {
        /// Target document.
        path: DocumentPath,
        /// Document body.
        data: DocumentData,
    },
    /// Merge fields into an existing document.
    Update {
        /// Target document.
        path: DocumentPath,
        /// Fields to merge.
        patch: DocumentData,
    },
    /// Delete a document.
    Delete {
        /// Target document.
        path: DocumentPath,
    },
    /// Apply one patch to many documents atomically.
    Batch {
        /// Collection reported when the batch fails.
        scope: CollectionPath,
        /// Documents and patch.
        batch: BatchUpdate,
    },
}

impl WriteRequest {
    /// Path reported for this request: the document, or the collection root
    /// for batches.
    pub fn target(&self) -> String {
        match self {
            Self::Create { path, .. }
            | Self::Update { path, .. }
            | Self::Delete { path } => path.to_string(),
            Self::Batch { scope, .. } => scope.to_string(),
        }
    }

    /// Operation the store's rules evaluate for this request.
    pub fn operation(&self) -> StoreOperation {
        match self {
            Self::Create { .. } => StoreOperation::Create,
            Self::Update { .. } | Self::Batch { .. } => StoreOperation::Update,
            Self::Delete { .. } => StoreOperation::Delete,
        }
    }

    /// Descriptor capturing exactly what this request attempted.
    pub fn descriptor(&self) -> PermissionErrorDescriptor {
        let target = self.target();
        match self {
            Self::Delete { .. } => PermissionErrorDescriptor::for_delete(target),
            Self::Create { data, .. } => {
                PermissionErrorDescriptor::for_create(target, Value::Object(data.clone()))
            }
            Self::Update { patch, .. } => {
                PermissionErrorDescriptor::for_update(target, Value::Object(patch.clone()))
            }
            Self::Batch { batch, .. } => {
                PermissionErrorDescriptor::for_update(target, Value::Object(batch.patch.clone()))
            }
        }
    }
}

/// Result of an optimistic write.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome<T> {
    /// The store acknowledged the write.
    Applied(T),
    /// The store rejected the write; the descriptor has been published.
    PermissionDenied(PermissionErrorDescriptor),
}

impl<T> WriteOutcome<T> {
    /// Whether the store acknowledged the write.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Descriptor of a rejected write.
    pub fn descriptor(&self) -> Option<&PermissionErrorDescriptor> {
        match self {
            Self::Applied(_) => None,
            Self::PermissionDenied(descriptor) => Some(descriptor),
        }
    }

    /// Value of an applied write.
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::PermissionDenied(_) => None,
        }
    }

    /// Transform the applied value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WriteOutcome<U> {
        match self {
            Self::Applied(value) => WriteOutcome::Applied(f(value)),
            Self::PermissionDenied(descriptor) => WriteOutcome::PermissionDenied(descriptor),
        }
    }
}

/// Spawn `task` on the runtime, carrying the caller's trace id into it.
pub(crate) fn spawn_traced<F>(task: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match TraceId::current() {
        Some(trace_id) => tokio::spawn(TraceId::scope(trace_id, task)),
        None => tokio::spawn(task),
    }
}

/// Issues document-store writes and translates their outcome.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use carehub::domain::{ErrorEventBus, OptimisticWriter, WriteRequest, paths};
/// use carehub::outbound::memory::InMemoryDocumentStore;
/// use serde_json::json;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let writer = OptimisticWriter::new(Arc::new(InMemoryDocumentStore::new()), ErrorEventBus::new());
/// let data = json!({ "name": "Jane Doe" }).as_object().cloned().unwrap();
/// let outcome = writer.add(&paths::patients(), data, |_| {}).await;
/// assert!(outcome.is_applied());
/// # });
/// ```
pub struct OptimisticWriter<S: ?Sized> {
    store: Arc<S>,
    bus: ErrorEventBus,
}

impl<S: ?Sized> Clone for OptimisticWriter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            bus: self.bus.clone(),
        }
    }
}

impl<S: ?Sized> OptimisticWriter<S> {
    /// Create a writer over `store` publishing failures on `bus`.
    pub fn new(store: Arc<S>, bus: ErrorEventBus) -> Self {
        Self { store, bus }
    }

    /// Bus that receives failure descriptors.
    pub fn bus(&self) -> &ErrorEventBus {
        &self.bus
    }
}

impl<S> OptimisticWriter<S>
where
    S: DocumentStore + ?Sized,
{
    /// Issue `request` and wait for the store's verdict.
    ///
    /// `on_success` runs exactly once after the store acknowledges the write
    /// and never runs on failure. On failure exactly one descriptor is
    /// emitted, including for batches.
    pub async fn apply<F>(&self, request: WriteRequest, on_success: F) -> WriteOutcome<()>
    where
        F: FnOnce(),
    {
        match self.issue(&request).await {
            Ok(()) => {
                debug!(
                    path = %request.target(),
                    operation = request.operation().as_str(),
                    "document write applied"
                );
                on_success();
                WriteOutcome::Applied(())
            }
            Err(error) => WriteOutcome::PermissionDenied(self.reject(&request, &error)),
        }
    }

    /// Create a document with a generated id inside `collection`.
    ///
    /// `on_success` receives the new document's path.
    pub async fn add<F>(
        &self,
        collection: &CollectionPath,
        data: DocumentData,
        on_success: F,
    ) -> WriteOutcome<DocumentPath>
    where
        F: FnOnce(&DocumentPath),
    {
        let path = collection.doc(&DocumentId::generate());
        let request = WriteRequest::Create {
            path: path.clone(),
            data,
        };
        let outcome = self.apply(request, || on_success(&path)).await;
        outcome.map(|()| path)
    }

    async fn issue(&self, request: &WriteRequest) -> Result<(), DocumentStoreError> {
        match request {
            WriteRequest::Create { path, data } => self.store.create(path, data).await,
            WriteRequest::Update { path, patch } => self.store.update(path, patch).await,
            WriteRequest::Delete { path } => self.store.delete(path).await,
            WriteRequest::Batch { batch, .. } => self.store.commit(batch).await,
        }
    }

    fn reject(&self, request: &WriteRequest, error: &DocumentStoreError) -> PermissionErrorDescriptor {
        let descriptor = request.descriptor();
        warn!(
            path = descriptor.path(),
            operation = descriptor.operation().as_str(),
            error = %error,
            "document write rejected"
        );
        self.bus.emit(ErrorEventName::PermissionError, &descriptor);
        descriptor
    }
}

impl<S> OptimisticWriter<S>
where
    S: DocumentStore + ?Sized + 'static,
{
    /// Issue `request` without waiting.
    ///
    /// The write runs on the tokio runtime inside the caller's trace scope.
    /// The handle may be dropped; the write still runs to completion.
    pub fn apply_detached<F>(&self, request: WriteRequest, on_success: F) -> JoinHandle<WriteOutcome<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        let writer = self.clone();
        spawn_traced(async move { writer.apply(request, on_success).await })
    }
}
