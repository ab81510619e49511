//! Care-facility backend core.
//!
//! The crate is laid out hexagonally:
//!
//! - [`domain`]: identifiers, store paths, the permission error descriptor,
//!   the error event bus, the optimistic write pipeline, the role resolver,
//!   live query binding and the services built on them.
//! - [`inbound`]: the actix-web HTTP adapter.
//! - [`outbound`]: document store adapters (in-memory and Firestore REST).
//! - [`doc`]: the OpenAPI document for the HTTP adapter.
//!
//! # Examples
//! ```
//! use carehub::domain::{ErrorEventBus, ErrorEventName, StoreOperation};
//!
//! let bus = ErrorEventBus::new();
//! let subscription = bus.subscribe(ErrorEventName::PermissionError, |descriptor| {
//!     assert_eq!(descriptor.operation(), StoreOperation::Create);
//! });
//! assert_eq!(bus.subscriber_count(ErrorEventName::PermissionError), 1);
//! assert!(subscription.unsubscribe());
//! ```

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use doc::ApiDoc;
pub use middleware::Trace;
