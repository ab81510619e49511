//! Cache-control policy for care data responses.

/// Care data is personal health information and must never be stored by
/// shared or browser caches.
pub const PRIVATE_NO_STORE: &str = "private, no-store";

/// Header tuple applied to every care data read.
pub const fn private_no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_STORE)
}
