//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CAREHUB_*` environment variables and config
//! files, in that order of precedence. [`ServerConfig::try_from`] validates
//! them into the shape the server needs.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use carehub::outbound::firestore::{
    DEFAULT_FIRESTORE_DATABASE, DEFAULT_FIRESTORE_ENDPOINT, FirestoreConfig,
};

use super::config::{ServerConfig, StoreConfig};
use super::token::read_token;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Raw server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAREHUB")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Document store backend: `memory` or `firestore`.
    pub store: Option<String>,
    /// Google Cloud project hosting the Firestore database.
    pub firestore_project_id: Option<String>,
    /// Firestore database id.
    pub firestore_database: Option<String>,
    /// Firestore REST base URL override, e.g. an emulator.
    pub firestore_endpoint: Option<String>,
    /// File holding the OAuth bearer token for Firestore.
    pub firestore_token_file: Option<PathBuf>,
    /// Per-request timeout for store calls, in seconds.
    #[ortho_config(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

/// Errors raised while validating [`ServerSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address does not parse.
    #[error("invalid bind address {value}: {source}")]
    InvalidBindAddr {
        /// Configured value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },
    /// The store kind is neither `memory` nor `firestore`.
    #[error("unknown store kind {0}; expected memory or firestore")]
    UnknownStore(String),
    /// Firestore was selected without a project id.
    #[error("firestore store requires CAREHUB_FIRESTORE_PROJECT_ID")]
    MissingProjectId,
    /// The Firestore endpoint override does not parse.
    #[error("invalid firestore endpoint {value}: {source}")]
    InvalidEndpoint {
        /// Configured value.
        value: String,
        /// Parse failure.
        source: url::ParseError,
    },
    /// The bearer token file cannot be read.
    #[error("failed to read firestore token file {path}: {source}")]
    TokenFile {
        /// Configured path.
        path: String,
        /// I/O failure.
        source: std::io::Error,
    },
    /// A zero request timeout would fail every store call.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

impl ServerSettings {
    /// Configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Configured store kind, falling back to `memory`.
    pub fn store(&self) -> &str {
        self.store.as_deref().unwrap_or("memory")
    }

    fn request_timeout(&self) -> Result<Duration, SettingsError> {
        match self.request_timeout_secs {
            0 => Err(SettingsError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    fn firestore(&self) -> Result<FirestoreConfig, SettingsError> {
        let project_id = self
            .firestore_project_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or(SettingsError::MissingProjectId)?;
        let raw_endpoint = self
            .firestore_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_FIRESTORE_ENDPOINT);
        let endpoint =
            Url::parse(raw_endpoint).map_err(|source| SettingsError::InvalidEndpoint {
                value: raw_endpoint.to_owned(),
                source,
            })?;
        let token = self
            .firestore_token_file
            .as_ref()
            .map(|path| {
                read_token(path).map_err(|source| SettingsError::TokenFile {
                    path: path.display().to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(FirestoreConfig {
            endpoint,
            project_id,
            database: self
                .firestore_database
                .clone()
                .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE.to_owned()),
            token,
            timeout: self.request_timeout()?,
        })
    }
}

impl TryFrom<&ServerSettings> for ServerConfig {
    type Error = SettingsError;

    fn try_from(settings: &ServerSettings) -> Result<Self, Self::Error> {
        let bind_addr: SocketAddr =
            settings
                .bind_addr()
                .parse()
                .map_err(|source| SettingsError::InvalidBindAddr {
                    value: settings.bind_addr().to_owned(),
                    source,
                })?;
        let store = match settings.store() {
            "memory" => StoreConfig::Memory,
            "firestore" => StoreConfig::Firestore(settings.firestore()?),
            other => return Err(SettingsError::UnknownStore(other.to_owned())),
        };
        Ok(ServerConfig::new(bind_addr, store))
    }
}
