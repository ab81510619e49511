//! User notifications.
//!
//! Notifications live under `users/{uid}/notifications`. They are created by
//! the success branch of other writes, and afterwards only their `read` flag
//! changes, from `false` to `true`. Nothing in this module writes
//! `read: false` to an existing notification.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::ports::{
    BatchUpdate, Document, DocumentData, DocumentStore, NotificationsCommand, NotificationsQuery,
    WriteTicket,
};
use crate::domain::store_errors::map_store_error;
use crate::domain::write_pipeline::spawn_traced;
use crate::domain::{
    DocumentId, Error, ErrorEventBus, OptimisticWriter, UserId, WriteOutcome, WriteRequest, paths,
};

/// A notification shown to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Document id within the user's notifications.
    pub id: DocumentId,
    /// Short headline.
    pub title: String,
    /// Longer text.
    pub description: String,
    /// In-app link, always starting with `/`.
    pub href: String,
    /// Creation instant.
    pub date: DateTime<Utc>,
    /// Whether the user has seen it.
    pub read: bool,
}

#[derive(Deserialize)]
struct StoredNotification {
    title: String,
    #[serde(default)]
    description: String,
    href: String,
    date: DateTime<Utc>,
    #[serde(default)]
    read: bool,
}

impl Notification {
    /// Decode a stored notification document.
    pub fn from_document(document: &Document) -> Result<Self, serde_json::Error> {
        let stored: StoredNotification =
            serde_json::from_value(Value::Object(document.data.clone()))?;
        Ok(Self {
            id: document.path.document_id(),
            title: stored.title,
            description: stored.description,
            href: stored.href,
            date: stored.date,
            read: stored.read,
        })
    }

    /// Mark the notification read. Read notifications stay read.
    pub fn mark_read(&mut self) {
        self.read = true;
    }
}

/// Validated draft of a notification.
///
/// # Examples
/// ```
/// use carehub::domain::NewNotification;
///
/// assert!(NewNotification::new("New patient", "Jane Doe was added", "/patients/p1").is_ok());
/// assert!(NewNotification::new("", "missing title", "/patients/p1").is_err());
/// assert!(NewNotification::new("Title", "external link", "https://example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    title: String,
    description: String,
    href: String,
}

impl NewNotification {
    /// Validate a draft. The title must not be blank and `href` must be an
    /// in-app path.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        href: impl Into<String>,
    ) -> Result<Self, Error> {
        let title = title.into();
        let href = href.into();
        if title.trim().is_empty() {
            return Err(Error::invalid_request("notification title must not be empty"));
        }
        if !href.starts_with('/') || href.starts_with("//") {
            return Err(Error::invalid_request(
                "notification href must be an in-app path starting with '/'",
            ));
        }
        Ok(Self {
            title,
            description: description.into(),
            href,
        })
    }

    /// In-app link of the draft.
    pub fn href(&self) -> &str {
        self.href.as_str()
    }

    fn into_document(self, date: DateTime<Utc>) -> DocumentData {
        let mut data = DocumentData::new();
        data.insert("title".to_owned(), Value::String(self.title));
        data.insert("description".to_owned(), Value::String(self.description));
        data.insert("href".to_owned(), Value::String(self.href));
        data.insert(
            "date".to_owned(),
            Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        data.insert("read".to_owned(), Value::Bool(false));
        data
    }
}

fn read_patch() -> DocumentData {
    let mut patch = DocumentData::new();
    patch.insert("read".to_owned(), json!(true));
    patch
}

/// Notification service implementing the notification driving ports.
pub struct NotificationService<S: ?Sized> {
    writer: OptimisticWriter<S>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> Clone for NotificationService<S> {
    fn clone(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: ?Sized> NotificationService<S> {
    /// Create a service writing through `store` and reporting failures on
    /// `bus`.
    pub fn new(store: Arc<S>, bus: ErrorEventBus, clock: Arc<dyn Clock>) -> Self {
        Self {
            writer: OptimisticWriter::new(Arc::clone(&store), bus),
            store,
            clock,
        }
    }
}

impl<S> NotificationService<S>
where
    S: DocumentStore + ?Sized,
{
    /// Create an unread notification for `user`.
    pub async fn notify(&self, user: &UserId, draft: NewNotification) -> WriteOutcome<Notification> {
        let date = self.clock.utc();
        let title = draft.title.clone();
        let description = draft.description.clone();
        let href = draft.href.clone();
        let outcome = self
            .writer
            .add(&paths::notifications(user), draft.into_document(date), |_| {})
            .await;
        outcome.map(|path| Notification {
            id: path.document_id(),
            title,
            description,
            href,
            date,
            read: false,
        })
    }

    /// Notifications for `user`, newest first.
    ///
    /// Documents that do not decode as notifications are skipped.
    pub async fn list(&self, user: &UserId) -> Result<Vec<Notification>, Error> {
        let documents = self
            .store
            .list(&paths::notifications(user))
            .await
            .map_err(map_store_error)?;
        let mut notifications: Vec<Notification> = documents
            .iter()
            .filter_map(|document| match Notification::from_document(document) {
                Ok(notification) => Some(notification),
                Err(error) => {
                    warn!(path = %document.path, error = %error, "skipping malformed notification");
                    None
                }
            })
            .collect();
        notifications.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(notifications)
    }

    /// Mark one notification read.
    pub async fn mark_as_read(&self, user: &UserId, id: &DocumentId) -> WriteOutcome<()> {
        let request = WriteRequest::Update {
            path: paths::notification(user, id),
            patch: read_patch(),
        };
        self.writer.apply(request, || {}).await
    }

    /// Mark the unread entries of `notifications` read in one batch.
    ///
    /// Returns the number of documents updated. When nothing is unread the
    /// store is not called. A failed batch yields a single descriptor for the
    /// notifications collection.
    pub async fn mark_all_as_read(
        &self,
        user: &UserId,
        notifications: &[Notification],
    ) -> WriteOutcome<usize> {
        let documents: Vec<_> = notifications
            .iter()
            .filter(|notification| !notification.read)
            .map(|notification| paths::notification(user, &notification.id))
            .collect();
        let count = documents.len();
        if count == 0 {
            return WriteOutcome::Applied(0);
        }
        let request = WriteRequest::Batch {
            scope: paths::notifications(user),
            batch: BatchUpdate::new(documents, read_patch()),
        };
        let outcome = self.writer.apply(request, || {}).await;
        outcome.map(|()| count)
    }
}

#[async_trait]
impl<S> NotificationsCommand for NotificationService<S>
where
    S: DocumentStore + ?Sized + 'static,
{
    async fn mark_as_read(&self, user: UserId, id: DocumentId) -> Result<WriteTicket, Error> {
        let ticket = WriteTicket::new(paths::notification(&user, &id));
        let service = self.clone();
        spawn_traced(async move {
            if let WriteOutcome::Applied(()) =
                NotificationService::mark_as_read(&service, &user, &id).await
            {
                debug!(user = %user, notification = %id, "notification marked read");
            }
        });
        Ok(ticket)
    }

    async fn mark_all_as_read(&self, user: UserId) -> Result<WriteTicket, Error> {
        let current = NotificationService::list(self, &user).await?;
        let ticket = WriteTicket::new(paths::notifications(&user));
        let service = self.clone();
        spawn_traced(async move {
            if let WriteOutcome::Applied(count) =
                NotificationService::mark_all_as_read(&service, &user, &current).await
            {
                debug!(user = %user, count, "notifications marked read");
            }
        });
        Ok(ticket)
    }
}

#[async_trait]
impl<S> NotificationsQuery for NotificationService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn list(&self, user: UserId) -> Result<Vec<Notification>, Error> {
        NotificationService::list(self, &user).await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{DocumentStoreError, MockDocumentStore};
    use crate::domain::{ErrorCode, ErrorEventName, PermissionErrorDescriptor};
    use chrono::{Local, TimeZone};
    use rstest::{fixture, rstest};
    use std::sync::Mutex;

    struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[fixture]
    fn user() -> UserId {
        UserId::new("nurse-1").expect("uid")
    }

    fn service(
        store: MockDocumentStore,
    ) -> (
        NotificationService<MockDocumentStore>,
        Arc<Mutex<Vec<PermissionErrorDescriptor>>>,
    ) {
        let bus = ErrorEventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = bus.subscribe(ErrorEventName::PermissionError, move |d| {
            sink.lock().expect("sink lock").push(d.clone());
        });
        let clock = Arc::new(FixtureClock { utc_now: at(9) });
        (NotificationService::new(Arc::new(store), bus, clock), seen)
    }

    fn notification(id: &str, read: bool, hour: u32) -> Notification {
        Notification {
            id: DocumentId::new(id).expect("id"),
            title: format!("title {id}"),
            description: String::new(),
            href: "/patients/p1".into(),
            date: at(hour),
            read,
        }
    }

    fn stored(user: &UserId, id: &str, read: bool, hour: u32) -> Document {
        let data = json!({
            "title": format!("title {id}"),
            "href": "/patients/p1",
            "date": at(hour).to_rfc3339(),
            "read": read,
        });
        Document {
            path: paths::notification(user, &DocumentId::new(id).expect("id")),
            data: data.as_object().cloned().expect("object literal"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn notify_creates_unread_notification_with_clock_date(user: UserId) {
        let mut store = MockDocumentStore::new();
        store
            .expect_create()
            .withf(|path, data| {
                path.collection().to_string() == "users/nurse-1/notifications"
                    && data.get("read") == Some(&json!(false))
                    && data.get("href") == Some(&json!("/patients/p1"))
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let (service, seen) = service(store);
        let draft = NewNotification::new("New patient", "Jane Doe", "/patients/p1").expect("draft");

        let created = service.notify(&user, draft).await.applied().expect("applied");

        assert!(!created.read);
        assert_eq!(created.date, at(9));
        assert!(seen.lock().expect("seen lock").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn list_orders_newest_first_and_skips_malformed(user: UserId) {
        let mut documents = vec![
            stored(&user, "older", true, 7),
            stored(&user, "newer", false, 8),
        ];
        documents.push(Document {
            path: paths::notification(&user, &DocumentId::new("broken").expect("id")),
            data: DocumentData::new(),
        });
        let mut store = MockDocumentStore::new();
        store
            .expect_list()
            .times(1)
            .returning(move |_| Ok(documents.clone()));
        let (service, _) = service(store);

        let listed = NotificationService::list(&service, &user).await.expect("list");

        let ids: Vec<_> = listed.iter().map(|n| n.id.to_string()).collect();
        assert_eq!(ids, vec!["newer", "older"]);
        assert!(listed[1].read);
    }

    #[rstest]
    #[tokio::test]
    async fn list_maps_denied_reads_to_forbidden(user: UserId) {
        let mut store = MockDocumentStore::new();
        store
            .expect_list()
            .returning(|_| Err(DocumentStoreError::permission_denied("rules")));
        let (service, _) = service(store);

        let error = NotificationService::list(&service, &user)
            .await
            .expect_err("denied");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn mark_all_batches_exactly_the_unread(user: UserId) {
        let mut store = MockDocumentStore::new();
        store
            .expect_commit()
            .withf(|batch| {
                let ids: Vec<_> = batch.documents.iter().map(|p| p.id().to_owned()).collect();
                ids == ["a", "c", "d"] && batch.patch.get("read") == Some(&json!(true))
            })
            .times(1)
            .returning(|_| Ok(()));
        let (service, seen) = service(store);
        let current = vec![
            notification("a", false, 1),
            notification("b", true, 2),
            notification("c", false, 3),
            notification("d", false, 4),
        ];

        let outcome = NotificationService::mark_all_as_read(&service, &user, &current).await;

        assert_eq!(outcome, WriteOutcome::Applied(3));
        assert!(seen.lock().expect("seen lock").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn command_marks_read_after_answering(user: UserId) {
        let (done, mut finished) = tokio::sync::mpsc::unbounded_channel();
        let mut store = MockDocumentStore::new();
        store
            .expect_update()
            .withf(|path, patch| {
                path.to_string() == "users/nurse-1/notifications/a"
                    && patch.get("read") == Some(&json!(true))
            })
            .times(1)
            .returning(move |_, _| {
                done.send(()).expect("test waits for the write");
                Ok(())
            });
        let (service, seen) = service(store);

        let ticket = NotificationsCommand::mark_as_read(&service, user, DocumentId::new("a").expect("id"))
            .await
            .expect("accepted");

        assert_eq!(ticket.path, "users/nurse-1/notifications/a");
        finished.recv().await.expect("detached write ran");
        assert!(seen.lock().expect("seen lock").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn mark_all_with_nothing_unread_skips_the_store(user: UserId) {
        let (service, _) = service(MockDocumentStore::new());
        let current = vec![notification("a", true, 1)];

        let outcome = NotificationService::mark_all_as_read(&service, &user, &current).await;

        assert_eq!(outcome, WriteOutcome::Applied(0));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_mark_all_emits_one_descriptor_for_the_collection(user: UserId) {
        let mut store = MockDocumentStore::new();
        store
            .expect_commit()
            .times(1)
            .returning(|_| Err(DocumentStoreError::permission_denied("rules")));
        let (service, seen) = service(store);
        let current: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|id| notification(id, false, 1))
            .collect();

        let outcome = NotificationService::mark_all_as_read(&service, &user, &current).await;

        assert!(!outcome.is_applied());
        let seen = seen.lock().expect("seen lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path(), "users/nurse-1/notifications");
    }

    #[test]
    fn mark_read_never_downgrades() {
        let mut item = notification("a", false, 1);
        item.mark_read();
        item.mark_read();
        assert!(item.read);
    }

    #[rstest]
    #[case("", "/x")]
    #[case("   ", "/x")]
    #[case("Title", "patients/p1")]
    #[case("Title", "//evil.example")]
    fn drafts_are_validated(#[case] title: &str, #[case] href: &str) {
        let error = NewNotification::new(title, "", href).expect_err("invalid draft");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }
}
