//! Read side of the document store.
//!
//! A [`LiveQuery`] follows one document or collection. It starts in
//! [`Snapshot::Loading`], moves to [`Snapshot::Ready`] once the first snapshot
//! arrives and is updated after every change under the watched path. Read
//! errors arrive as [`Snapshot::Failed`] rather than in the data channel.
//! Dropping the query (or calling [`LiveQuery::unsubscribe`]) ends delivery.

use tokio::sync::watch;

use crate::domain::ports::DocumentStoreError;

/// State of a live query.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot<T> {
    /// No snapshot has arrived yet.
    Loading,
    /// Latest data.
    Ready(T),
    /// The store refused or failed the read.
    Failed(DocumentStoreError),
}

/// Subscription to a document or collection.
///
/// # Examples
/// ```
/// use carehub::domain::{LiveQuery, Snapshot};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let (publisher, mut query) = LiveQuery::<u32>::channel();
/// assert!(query.is_loading());
/// publisher.send_replace(Snapshot::Ready(7));
/// assert_eq!(query.changed().await, Some(Snapshot::Ready(7)));
/// assert_eq!(query.data(), Some(7));
/// # });
/// ```
#[derive(Debug)]
pub struct LiveQuery<T> {
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Clone> LiveQuery<T> {
    /// Query in the loading state plus the sender adapters publish through.
    pub fn channel() -> (watch::Sender<Snapshot<T>>, Self) {
        let (sender, receiver) = watch::channel(Snapshot::Loading);
        (sender, Self { receiver })
    }

    /// Latest snapshot.
    pub fn current(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// True until the first snapshot or error arrives.
    pub fn is_loading(&self) -> bool {
        matches!(*self.receiver.borrow(), Snapshot::Loading)
    }

    /// Latest data, if the query is ready.
    pub fn data(&self) -> Option<T> {
        match &*self.receiver.borrow() {
            Snapshot::Ready(data) => Some(data.clone()),
            Snapshot::Loading | Snapshot::Failed(_) => None,
        }
    }

    /// Latest read error, if the query failed.
    pub fn error(&self) -> Option<DocumentStoreError> {
        match &*self.receiver.borrow() {
            Snapshot::Failed(error) => Some(error.clone()),
            Snapshot::Loading | Snapshot::Ready(_) => None,
        }
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the source has stopped publishing.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Stop receiving snapshots.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn starts_loading_with_no_data_or_error() {
        let (_publisher, query) = LiveQuery::<u32>::channel();
        assert!(query.is_loading());
        assert_eq!(query.data(), None);
        assert_eq!(query.error(), None);
    }

    #[tokio::test]
    async fn errors_are_reported_separately_from_data() {
        let (publisher, mut query) = LiveQuery::<u32>::channel();
        publisher.send_replace(Snapshot::Failed(DocumentStoreError::permission_denied("rules")));

        let snapshot = query.changed().await;

        assert!(matches!(snapshot, Some(Snapshot::Failed(_))));
        assert!(!query.is_loading());
        assert_eq!(query.data(), None);
        assert_eq!(
            query.error(),
            Some(DocumentStoreError::permission_denied("rules"))
        );
    }

    #[tokio::test]
    async fn changed_ends_when_source_stops() {
        let (publisher, mut query) = LiveQuery::<u32>::channel();
        drop(publisher);
        assert_eq!(query.changed().await, None);
    }

    #[test]
    fn unsubscribing_closes_the_channel() {
        let (publisher, query) = LiveQuery::<u32>::channel();
        query.unsubscribe();
        assert!(publisher.is_closed());
    }
}
