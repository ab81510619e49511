//! HTTP server configuration object.

use std::net::SocketAddr;

use carehub::outbound::firestore::FirestoreConfig;

/// Document store backend selection.
#[derive(Debug)]
pub enum StoreConfig {
    /// In-process store; data is lost on restart.
    Memory,
    /// Firestore REST store.
    Firestore(FirestoreConfig),
}

/// Validated configuration for creating the HTTP server.
#[derive(Debug)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: StoreConfig,
}

impl ServerConfig {
    /// Construct a server configuration.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, store: StoreConfig) -> Self {
        Self { bind_addr, store }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the selected store backend.
    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Read by settings tests; the server moves the field")
    )]
    #[must_use]
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }
}
