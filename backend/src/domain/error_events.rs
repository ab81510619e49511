//! Publish/subscribe channel for permission errors.
//!
//! The bus decouples the point of failure (a write deep inside a service)
//! from the single place that surfaces errors. It is an explicit registry
//! passed through construction rather than a process global; clones share
//! the same subscriber list.
//!
//! Dispatch is synchronous and fire-and-forget: handlers registered when
//! [`ErrorEventBus::emit`] takes its snapshot run in registration order, and
//! an event emitted with no subscribers is dropped.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::warn;

use crate::domain::PermissionErrorDescriptor;

/// Events carried by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorEventName {
    /// A document-store operation was rejected.
    PermissionError,
}

impl ErrorEventName {
    /// Stable event name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PermissionError => "permission-error",
        }
    }
}

impl fmt::Display for ErrorEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Handler = Arc<dyn Fn(&PermissionErrorDescriptor) + Send + Sync>;

struct Registration {
    id: u64,
    event: ErrorEventName,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    subscribers: RwLock<Vec<Registration>>,
}

impl Registry {
    fn remove(&self, id: u64) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|registration| registration.id != id);
        subscribers.len() != before
    }
}

/// Shared registry of error event handlers.
///
/// # Examples
/// ```
/// use std::sync::{Arc, Mutex};
/// use carehub::domain::{ErrorEventBus, ErrorEventName, PermissionErrorDescriptor};
///
/// let bus = ErrorEventBus::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let subscription = bus.subscribe(ErrorEventName::PermissionError, move |descriptor| {
///     sink.lock().expect("lock").push(descriptor.path().to_owned());
/// });
///
/// bus.emit(
///     ErrorEventName::PermissionError,
///     &PermissionErrorDescriptor::for_delete("staff/s1"),
/// );
/// assert_eq!(*seen.lock().expect("lock"), vec!["staff/s1".to_owned()]);
/// assert!(subscription.unsubscribe());
/// ```
#[derive(Clone, Default)]
pub struct ErrorEventBus {
    registry: Arc<Registry>,
}

impl fmt::Debug for ErrorEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorEventBus")
            .field(
                "subscribers",
                &self.subscriber_count(ErrorEventName::PermissionError),
            )
            .finish()
    }
}

impl ErrorEventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`.
    ///
    /// The returned [`Subscription`] deregisters the handler when
    /// [`Subscription::unsubscribe`] is called. Dropping it leaves the handler
    /// registered for the lifetime of the bus.
    pub fn subscribe<F>(&self, event: ErrorEventName, handler: F) -> Subscription
    where
        F: Fn(&PermissionErrorDescriptor) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration {
                id,
                event,
                handler: Arc::new(handler),
            });
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `descriptor` to every handler registered for `event`.
    ///
    /// Handlers run outside the registry lock, so they may subscribe or
    /// unsubscribe without deadlocking; such changes apply from the next
    /// emit. A panicking handler is logged and skipped.
    pub fn emit(&self, event: ErrorEventName, descriptor: &PermissionErrorDescriptor) {
        let handlers: Vec<Handler> = self
            .registry
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|registration| registration.event == event)
            .map(|registration| Arc::clone(&registration.handler))
            .collect();

        for handler in handlers {
            let outcome = catch_unwind(AssertUnwindSafe(|| handler(descriptor)));
            if outcome.is_err() {
                warn!(
                    event = event.as_str(),
                    path = descriptor.path(),
                    operation = descriptor.operation().as_str(),
                    "error event handler panicked"
                );
            }
        }
    }

    /// Number of handlers currently registered for `event`.
    pub fn subscriber_count(&self, event: ErrorEventName) -> usize {
        self.registry
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|registration| registration.event == event)
            .count()
    }
}

/// Capability to remove a handler from the bus.
#[must_use = "dropping a subscription keeps the handler registered; call unsubscribe to remove it"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Remove the handler. Returns `false` if the bus is gone or the handler
    /// was already removed.
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id))
    }
}
