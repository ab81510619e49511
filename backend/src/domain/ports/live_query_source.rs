//! Port for live queries against the document store.

use crate::domain::{CollectionPath, DocumentPath, LiveQuery, Snapshot};

use super::Document;

/// Source of [`LiveQuery`] subscriptions.
///
/// Implementations deliver an initial snapshot (an absent document is
/// `Ready(None)`), a new snapshot after every change under the watched path,
/// and a `Failed` snapshot when reads are refused. They must stop publishing
/// to queries that have been dropped.
#[cfg_attr(test, mockall::automock)]
pub trait LiveQuerySource: Send + Sync {
    /// Follow a single document.
    fn watch_document(&self, path: &DocumentPath) -> LiveQuery<Option<Document>>;

    /// Follow every document directly inside a collection.
    fn watch_collection(&self, collection: &CollectionPath) -> LiveQuery<Vec<Document>>;
}

/// Fixture source that reports every target as empty and never changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLiveQuerySource;

impl LiveQuerySource for FixtureLiveQuerySource {
    fn watch_document(&self, _path: &DocumentPath) -> LiveQuery<Option<Document>> {
        let (publisher, query) = LiveQuery::channel();
        publisher.send_replace(Snapshot::Ready(None));
        query
    }

    fn watch_collection(&self, _collection: &CollectionPath) -> LiveQuery<Vec<Document>> {
        let (publisher, query) = LiveQuery::channel();
        publisher.send_replace(Snapshot::Ready(Vec::new()));
        query
    }
}
