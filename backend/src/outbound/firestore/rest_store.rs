//! Reqwest-backed Firestore document store.
//!
//! Speaks the Firestore REST v1 document API. The adapter owns transport
//! details only: URL construction, bearer authentication, typed-value
//! encoding and HTTP error mapping. Security rules are enforced by Firestore
//! and surface as [`DocumentStoreError::PermissionDenied`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use super::value::{decode_fields, encode_fields};
use crate::domain::ports::{
    BatchUpdate, Document, DocumentData, DocumentStore, DocumentStoreError, SetMode,
};
use crate::domain::{CollectionPath, DocumentPath};

/// Public Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1/";
/// Database used when none is configured.
pub const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";
const LIST_PAGE_SIZE: &str = "300";

/// Connection settings for [`FirestoreRestStore`].
pub struct FirestoreConfig {
    /// REST base URL, e.g. [`DEFAULT_FIRESTORE_ENDPOINT`] or an emulator.
    pub endpoint: Url,
    /// Google Cloud project id.
    pub project_id: String,
    /// Database id within the project.
    pub database: String,
    /// OAuth bearer token; omitted for the emulator.
    pub token: Option<Zeroizing<String>>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Document store adapter for Firestore.
pub struct FirestoreRestStore {
    client: Client,
    endpoint: Url,
    database_name: String,
    token: Option<Zeroizing<String>>,
}

/// Errors raised while constructing a [`FirestoreRestStore`].
#[derive(Debug, thiserror::Error)]
pub enum FirestoreSetupError {
    /// The endpoint cannot carry path segments.
    #[error("firestore endpoint {0} cannot be used as a base URL")]
    InvalidEndpoint(String),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl FirestoreRestStore {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint cannot be a base URL or the reqwest
    /// client cannot be constructed.
    pub fn new(config: FirestoreConfig) -> Result<Self, FirestoreSetupError> {
        if config.endpoint.cannot_be_a_base() {
            return Err(FirestoreSetupError::InvalidEndpoint(config.endpoint.to_string()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            database_name: format!(
                "projects/{}/databases/{}",
                config.project_id, config.database
            ),
            token: config.token,
        })
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(self.database_name.split('/'));
            path.extend(segments);
        }
        url
    }

    fn documents_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        self.url(std::iter::once("documents").chain(segments))
    }

    fn document_url(&self, path: &DocumentPath) -> Url {
        self.documents_url(path.segments().iter().map(String::as_str))
    }

    fn resource_name(&self, path: &DocumentPath) -> String {
        format!("{}/documents/{path}", self.database_name)
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, target: &str) -> Result<Vec<u8>, DocumentStoreError> {
        let response = self
            .authorised(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            debug!(status = status.as_u16(), target, "firestore request failed");
            return Err(map_status_error(status, body.as_ref(), target));
        }
        Ok(body.to_vec())
    }

    async fn patch(
        &self,
        path: &DocumentPath,
        data: &DocumentData,
        mask: Option<&DocumentData>,
        must_exist: bool,
    ) -> Result<(), DocumentStoreError> {
        let mut url = self.document_url(path);
        {
            let mut query = url.query_pairs_mut();
            for field in mask.into_iter().flat_map(Map::keys) {
                query.append_pair("updateMask.fieldPaths", &field_path(field));
            }
            if must_exist {
                query.append_pair("currentDocument.exists", "true");
            }
        }
        let request = self
            .client
            .patch(url)
            .json(&json!({ "fields": encode_fields(data) }));
        self.send(request, &path.to_string()).await.map(drop)
    }

    fn decode_document(&self, document: FirestoreDocument) -> Result<Document, DocumentStoreError> {
        let prefix = format!("{}/documents/", self.database_name);
        let relative = document.name.strip_prefix(&prefix).ok_or_else(|| {
            DocumentStoreError::query(format!("unexpected document name {}", document.name))
        })?;
        let path = DocumentPath::parse(relative)
            .map_err(|error| DocumentStoreError::query(error.to_string()))?;
        let data = match document.fields {
            Some(fields) => decode_fields(&fields)?,
            None => DocumentData::new(),
        };
        Ok(Document { path, data })
    }
}

#[async_trait]
impl DocumentStore for FirestoreRestStore {
    async fn create(
        &self,
        path: &DocumentPath,
        data: &DocumentData,
    ) -> Result<(), DocumentStoreError> {
        let collection = path.collection();
        let mut url = self.documents_url(collection.segments().iter().map(String::as_str));
        url.query_pairs_mut().append_pair("documentId", path.id());
        let request = self
            .client
            .post(url)
            .json(&json!({ "fields": encode_fields(data) }));
        self.send(request, &path.to_string()).await.map(drop)
    }

    async fn set(
        &self,
        path: &DocumentPath,
        data: &DocumentData,
        mode: SetMode,
    ) -> Result<(), DocumentStoreError> {
        let mask = match mode {
            SetMode::Overwrite => None,
            SetMode::Merge => Some(data),
        };
        self.patch(path, data, mask, false).await
    }

    async fn update(
        &self,
        path: &DocumentPath,
        patch: &DocumentData,
    ) -> Result<(), DocumentStoreError> {
        self.patch(path, patch, Some(patch), true).await
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentStoreError> {
        let request = self.client.delete(self.document_url(path));
        self.send(request, &path.to_string()).await.map(drop)
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentStoreError> {
        let request = self.client.get(self.document_url(path));
        let body = match self.send(request, &path.to_string()).await {
            Ok(body) => body,
            Err(DocumentStoreError::NotFound { .. }) => return Ok(None),
            Err(error) => return Err(error),
        };
        let document: FirestoreDocument = serde_json::from_slice(&body).map_err(map_decode_error)?;
        self.decode_document(document).map(Some)
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, DocumentStoreError> {
        let target = collection.to_string();
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = self.documents_url(collection.segments().iter().map(String::as_str));
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", LIST_PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }
            let body = self.send(self.client.get(url), &target).await?;
            let page: ListResponse = serde_json::from_slice(&body).map_err(map_decode_error)?;
            for document in page.documents {
                documents.push(self.decode_document(document)?);
            }
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(documents)
    }

    async fn commit(&self, batch: &BatchUpdate) -> Result<(), DocumentStoreError> {
        let mask: Vec<String> = batch.patch.keys().map(|key| field_path(key)).collect();
        let writes: Vec<Value> = batch
            .documents
            .iter()
            .map(|path| {
                json!({
                    "update": {
                        "name": self.resource_name(path),
                        "fields": encode_fields(&batch.patch),
                    },
                    "updateMask": { "fieldPaths": mask },
                    "currentDocument": { "exists": true },
                })
            })
            .collect();
        let request = self
            .client
            .post(self.url(["documents:commit"]))
            .json(&json!({ "writes": writes }));
        self.send(request, "documents:commit").await.map(drop)
    }
}

/// Quote a field name for an update mask when it is not a simple identifier.
fn field_path(field: &str) -> String {
    let mut chars = field.chars();
    let simple = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_owned()
    } else {
        format!("`{}`", field.replace('\\', r"\\").replace('`', r"\`"))
    }
}

fn map_transport_error(error: reqwest::Error) -> DocumentStoreError {
    if error.is_timeout() {
        DocumentStoreError::connection(format!("request timed out: {error}"))
    } else {
        DocumentStoreError::connection(error.to_string())
    }
}

fn map_decode_error(error: serde_json::Error) -> DocumentStoreError {
    DocumentStoreError::query(format!("invalid Firestore JSON payload: {error}"))
}

fn map_status_error(status: StatusCode, body: &[u8], target: &str) -> DocumentStoreError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DocumentStoreError::permission_denied(message)
        }
        StatusCode::NOT_FOUND => DocumentStoreError::not_found(target),
        StatusCode::CONFLICT => DocumentStoreError::already_exists(target),
        StatusCode::BAD_REQUEST => DocumentStoreError::invalid_argument(message),
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => DocumentStoreError::connection(message),
        _ => DocumentStoreError::query(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
