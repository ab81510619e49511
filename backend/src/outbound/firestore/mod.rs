//! Firestore outbound adapter.
//!
//! - **rest_store**: [`FirestoreRestStore`], the REST v1 document store.
//! - **value**: JSON to Firestore typed-value codec.

mod rest_store;
pub mod value;

pub use rest_store::{
    DEFAULT_FIRESTORE_DATABASE, DEFAULT_FIRESTORE_ENDPOINT, FirestoreConfig, FirestoreRestStore,
    FirestoreSetupError,
};
