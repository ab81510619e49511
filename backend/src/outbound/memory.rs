//! In-process document store.
//!
//! Backs the server when no Firestore project is configured and drives the
//! behavioural tests. [`AccessRules`] stand in for store-side security rules
//! so permission failures can be provoked without a network.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::ports::{
    BatchUpdate, Document, DocumentData, DocumentStore, DocumentStoreError, LiveQuerySource,
    SetMode,
};
use crate::domain::{CollectionPath, DocumentPath, LiveQuery, Snapshot, StoreOperation};

/// Operation and path-prefix pairs the store refuses.
///
/// A prefix matches a path when it is equal to it or names one of its
/// ancestors, so `patients` covers `patients/p1/sleepLogs/s1`.
///
/// # Examples
/// ```
/// use carehub::domain::StoreOperation;
/// use carehub::outbound::memory::AccessRules;
///
/// let rules = AccessRules::allow_all().deny(StoreOperation::Update, "patients");
/// assert!(!rules.permits(StoreOperation::Update, "patients/p1"));
/// assert!(rules.permits(StoreOperation::Update, "patientsArchive/p1"));
/// assert!(rules.permits(StoreOperation::Read, "patients/p1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRules {
    denied: Vec<(StoreOperation, String)>,
}

impl AccessRules {
    /// Rules permitting everything.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Refuse `operation` on `prefix` and everything beneath it.
    #[must_use]
    pub fn deny(mut self, operation: StoreOperation, prefix: impl Into<String>) -> Self {
        self.denied.push((operation, prefix.into()));
        self
    }

    /// Refuse every operation on `prefix`.
    #[must_use]
    pub fn deny_all(self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        [
            StoreOperation::Create,
            StoreOperation::Read,
            StoreOperation::Update,
            StoreOperation::Delete,
        ]
        .into_iter()
        .fold(self, |rules, operation| rules.deny(operation, prefix.clone()))
    }

    /// Whether `operation` on `path` is allowed.
    pub fn permits(&self, operation: StoreOperation, path: &str) -> bool {
        !self.denied.iter().any(|(denied, prefix)| {
            *denied == operation
                && (path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/')))
        })
    }

    fn check(&self, operation: StoreOperation, path: &str) -> Result<(), DocumentStoreError> {
        if self.permits(operation, path) {
            Ok(())
        } else {
            Err(DocumentStoreError::permission_denied(format!(
                "{operation} on {path} is not allowed"
            )))
        }
    }
}

struct DocumentWatcher {
    path: DocumentPath,
    sender: watch::Sender<Snapshot<Option<Document>>>,
}

struct CollectionWatcher {
    collection: CollectionPath,
    sender: watch::Sender<Snapshot<Vec<Document>>>,
}

#[derive(Default)]
struct State {
    documents: BTreeMap<String, Document>,
    rules: AccessRules,
    document_watchers: Vec<DocumentWatcher>,
    collection_watchers: Vec<CollectionWatcher>,
}

impl State {
    fn document_snapshot(&self, path: &DocumentPath) -> Snapshot<Option<Document>> {
        let key = path.to_string();
        match self.rules.check(StoreOperation::Read, &key) {
            Ok(()) => Snapshot::Ready(self.documents.get(&key).cloned()),
            Err(error) => Snapshot::Failed(error),
        }
    }

    fn collection_snapshot(&self, collection: &CollectionPath) -> Snapshot<Vec<Document>> {
        match self.rules.check(StoreOperation::Read, &collection.to_string()) {
            Ok(()) => Snapshot::Ready(self.collection(collection)),
            Err(error) => Snapshot::Failed(error),
        }
    }

    fn collection(&self, collection: &CollectionPath) -> Vec<Document> {
        self.documents
            .values()
            .filter(|document| collection.contains(&document.path))
            .cloned()
            .collect()
    }

    /// Publish fresh snapshots to watchers of `changed` and drop watchers
    /// whose queries are gone.
    fn publish(&mut self, changed: &[DocumentPath]) {
        self.document_watchers.retain(|watcher| !watcher.sender.is_closed());
        self.collection_watchers
            .retain(|watcher| !watcher.sender.is_closed());

        for watcher in &self.document_watchers {
            if changed.contains(&watcher.path) {
                watcher.sender.send_replace(self.document_snapshot(&watcher.path));
            }
        }
        for watcher in &self.collection_watchers {
            if changed.iter().any(|path| watcher.collection.contains(path)) {
                watcher
                    .sender
                    .send_replace(self.collection_snapshot(&watcher.collection));
            }
        }
    }
}

fn merge(target: &mut DocumentData, patch: &DocumentData) {
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
}

/// Document store held in process memory.
///
/// # Examples
/// ```
/// use carehub::domain::{DocumentId, paths};
/// use carehub::domain::ports::{DocumentData, DocumentStore};
/// use carehub::outbound::memory::InMemoryDocumentStore;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryDocumentStore::new();
/// let path = paths::patient(&DocumentId::new("p1").unwrap());
/// store.create(&path, &DocumentData::new()).await.unwrap();
/// assert!(store.get(&path).await.unwrap().is_some());
/// # });
/// ```
#[derive(Default)]
pub struct InMemoryDocumentStore {
    state: RwLock<State>,
}

impl InMemoryDocumentStore {
    /// Empty store permitting everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store enforcing `rules`.
    pub fn with_rules(rules: AccessRules) -> Self {
        let store = Self::new();
        store.set_rules(rules);
        store
    }

    /// Replace the access rules.
    pub fn set_rules(&self, rules: AccessRules) {
        self.write().rules = rules;
    }

    /// Insert a document without consulting the rules.
    pub fn seed(&self, path: DocumentPath, data: DocumentData) {
        let mut state = self.write();
        state.documents.insert(
            path.to_string(),
            Document {
                path: path.clone(),
                data,
            },
        );
        state.publish(&[path]);
    }

    /// Read a document without consulting the rules.
    pub fn peek(&self, path: &DocumentPath) -> Option<DocumentData> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .documents
            .get(&path.to_string())
            .map(|document| document.data.clone())
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .documents
            .len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_checked<T>(
        &self,
        path: &str,
        read: impl FnOnce(&State) -> T,
    ) -> Result<T, DocumentStoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.rules.check(StoreOperation::Read, path)?;
        Ok(read(&state))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(
        &self,
        path: &DocumentPath,
        data: &DocumentData,
    ) -> Result<(), DocumentStoreError> {
        let key = path.to_string();
        let mut state = self.write();
        state.rules.check(StoreOperation::Create, &key)?;
        if state.documents.contains_key(&key) {
            return Err(DocumentStoreError::already_exists(key));
        }
        state.documents.insert(
            key,
            Document {
                path: path.clone(),
                data: data.clone(),
            },
        );
        state.publish(std::slice::from_ref(path));
        Ok(())
    }

    async fn set(
        &self,
        path: &DocumentPath,
        data: &DocumentData,
        mode: SetMode,
    ) -> Result<(), DocumentStoreError> {
        let key = path.to_string();
        let mut state = self.write();
        let operation = if state.documents.contains_key(&key) {
            StoreOperation::Update
        } else {
            StoreOperation::Create
        };
        state.rules.check(operation, &key)?;
        let document = state.documents.entry(key).or_insert_with(|| Document {
            path: path.clone(),
            data: DocumentData::new(),
        });
        match mode {
            SetMode::Overwrite => document.data = data.clone(),
            SetMode::Merge => merge(&mut document.data, data),
        }
        state.publish(std::slice::from_ref(path));
        Ok(())
    }

    async fn update(
        &self,
        path: &DocumentPath,
        patch: &DocumentData,
    ) -> Result<(), DocumentStoreError> {
        let key = path.to_string();
        let mut state = self.write();
        state.rules.check(StoreOperation::Update, &key)?;
        let document = state
            .documents
            .get_mut(&key)
            .ok_or_else(|| DocumentStoreError::not_found(key.clone()))?;
        merge(&mut document.data, patch);
        state.publish(std::slice::from_ref(path));
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentStoreError> {
        let key = path.to_string();
        let mut state = self.write();
        state.rules.check(StoreOperation::Delete, &key)?;
        if state.documents.remove(&key).is_some() {
            state.publish(std::slice::from_ref(path));
        }
        Ok(())
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentStoreError> {
        let key = path.to_string();
        self.read_checked(&key, |state| state.documents.get(&key).cloned())
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, DocumentStoreError> {
        self.read_checked(&collection.to_string(), |state| state.collection(collection))
    }

    async fn commit(&self, batch: &BatchUpdate) -> Result<(), DocumentStoreError> {
        let mut state = self.write();
        for path in &batch.documents {
            let key = path.to_string();
            state.rules.check(StoreOperation::Update, &key)?;
            if !state.documents.contains_key(&key) {
                return Err(DocumentStoreError::not_found(key));
            }
        }
        for path in &batch.documents {
            if let Some(document) = state.documents.get_mut(&path.to_string()) {
                merge(&mut document.data, &batch.patch);
            }
        }
        state.publish(&batch.documents);
        Ok(())
    }
}

impl LiveQuerySource for InMemoryDocumentStore {
    fn watch_document(&self, path: &DocumentPath) -> LiveQuery<Option<Document>> {
        let (sender, query) = LiveQuery::channel();
        let mut state = self.write();
        sender.send_replace(state.document_snapshot(path));
        state.document_watchers.push(DocumentWatcher {
            path: path.clone(),
            sender,
        });
        query
    }

    fn watch_collection(&self, collection: &CollectionPath) -> LiveQuery<Vec<Document>> {
        let (sender, query) = LiveQuery::channel();
        let mut state = self.write();
        sender.send_replace(state.collection_snapshot(collection));
        state.collection_watchers.push(CollectionWatcher {
            collection: collection.clone(),
            sender,
        });
        query
    }
}
