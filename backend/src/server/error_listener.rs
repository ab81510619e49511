//! The process-wide permission error listener.
//!
//! Exactly one listener is installed on the bus at startup. It surfaces every
//! rejected write in the structured log so operators can see the denied
//! request alongside the trace id of the HTTP call that dispatched it.

use carehub::domain::{ErrorEventBus, ErrorEventName, Subscription, TraceId};
use tracing::error;

/// Register the listener on `bus`.
pub(crate) fn install(bus: &ErrorEventBus) -> Subscription {
    bus.subscribe(ErrorEventName::PermissionError, |descriptor| {
        error!(
            path = descriptor.path(),
            operation = descriptor.operation().as_str(),
            trace_id = %TraceId::current().map(|id| id.to_string()).unwrap_or_default(),
            context = %descriptor.request_context(),
            "{descriptor}"
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use carehub::domain::PermissionErrorDescriptor;

    #[test]
    fn installs_exactly_one_handler() {
        let bus = ErrorEventBus::new();

        let subscription = install(&bus);

        assert_eq!(bus.subscriber_count(ErrorEventName::PermissionError), 1);
        bus.emit(
            ErrorEventName::PermissionError,
            &PermissionErrorDescriptor::for_delete("patients/p1"),
        );
        assert!(subscription.unsubscribe());
    }
}
