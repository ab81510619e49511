//! Shared validation helpers for inbound HTTP adapters.

use actix_web::{HttpRequest, error::JsonPayloadError, web};
use serde_json::json;

use crate::domain::{CareEntryKind, DocumentId, Error};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    InvalidId,
    UnknownKind,
    InvalidJson,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            ValidationCode::InvalidId => "invalid_id",
            ValidationCode::UnknownKind => "unknown_kind",
            ValidationCode::InvalidJson => "invalid_json",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ValidationCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_document_id(value: String, field: FieldName) -> Result<DocumentId, Error> {
    DocumentId::new(value.clone()).map_err(|error| {
        field_error(
            field,
            ValidationCode::InvalidId,
            format!("{} is not a valid id: {error}", field.as_str()),
            &value,
        )
    })
}

pub(crate) fn parse_entry_kind(value: &str, field: FieldName) -> Result<CareEntryKind, Error> {
    value.parse().map_err(|error| {
        field_error(field, ValidationCode::UnknownKind, format!("{error}"), value)
    })
}

fn map_json_error(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {error}"))
        .with_details(json!({ "code": ValidationCode::InvalidJson.as_str() }))
        .into()
}

/// JSON extractor configuration reporting malformed bodies with the domain
/// error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(map_json_error)
}
