//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: in-process document store with emulated security rules and
//!   live queries.
//! - **firestore**: Firestore REST v1 document store.
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod firestore;
pub mod memory;
