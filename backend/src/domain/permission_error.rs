//! Structured description of a rejected document-store operation.
//!
//! A [`PermissionErrorDescriptor`] captures exactly what was attempted: the
//! target path, the operation kind and, for creates and updates, the payload.
//! It is built once per failed write, published on the
//! [`crate::domain::ErrorEventBus`], and never mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Operation kind recorded on a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreOperation {
    /// Document creation.
    Create,
    /// Document or collection read.
    Read,
    /// Document update, including merges and batches.
    Update,
    /// Document deletion.
    Delete,
}

impl StoreOperation {
    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a denied operation.
///
/// # Examples
/// ```
/// use carehub::domain::{PermissionErrorDescriptor, StoreOperation};
/// use serde_json::json;
///
/// let descriptor =
///     PermissionErrorDescriptor::for_update("patients/p1", json!({ "name": "Jane" }));
/// assert_eq!(descriptor.operation(), StoreOperation::Update);
/// assert_eq!(descriptor.path(), "patients/p1");
/// assert_eq!(descriptor.request_resource_data(), Some(&json!({ "name": "Jane" })));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionErrorDescriptor {
    path: String,
    operation: StoreOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_resource_data: Option<Value>,
}

impl PermissionErrorDescriptor {
    /// Descriptor for a rejected create carrying the attempted body.
    pub fn for_create(path: impl Into<String>, data: Value) -> Self {
        Self::with_payload(path, StoreOperation::Create, Some(data))
    }

    /// Descriptor for a rejected update carrying the attempted patch.
    pub fn for_update(path: impl Into<String>, patch: Value) -> Self {
        Self::with_payload(path, StoreOperation::Update, Some(patch))
    }

    /// Descriptor for a rejected delete.
    pub fn for_delete(path: impl Into<String>) -> Self {
        Self::with_payload(path, StoreOperation::Delete, None)
    }

    /// Descriptor for a rejected read.
    pub fn for_read(path: impl Into<String>) -> Self {
        Self::with_payload(path, StoreOperation::Read, None)
    }

    fn with_payload(
        path: impl Into<String>,
        operation: StoreOperation,
        request_resource_data: Option<Value>,
    ) -> Self {
        Self {
            path: path.into(),
            operation,
            request_resource_data,
        }
    }

    /// Document or collection path that was targeted.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Operation that was attempted.
    pub fn operation(&self) -> StoreOperation {
        self.operation
    }

    /// Payload that was attempted, for creates and updates.
    pub fn request_resource_data(&self) -> Option<&Value> {
        self.request_resource_data.as_ref()
    }

    /// Request context in the shape security-rule debuggers expect.
    pub fn request_context(&self) -> Value {
        let mut request = json!({
            "method": self.operation.as_str(),
            "path": format!("/databases/(default)/documents/{}", self.path),
        });
        if let (Some(data), Some(object)) =
            (self.request_resource_data.as_ref(), request.as_object_mut())
        {
            object.insert("resource".to_owned(), json!({ "data": data }));
        }
        request
    }
}

impl fmt::Display for PermissionErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing or insufficient permissions: the following request was denied by security rules:\n{:#}",
            self.request_context()
        )
    }
}

impl std::error::Error for PermissionErrorDescriptor {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PermissionErrorDescriptor::for_create("patients/p1", json!({})), StoreOperation::Create, true)]
    #[case(PermissionErrorDescriptor::for_update("patients/p1", json!({})), StoreOperation::Update, true)]
    #[case(PermissionErrorDescriptor::for_delete("patients/p1"), StoreOperation::Delete, false)]
    #[case(PermissionErrorDescriptor::for_read("patients/p1"), StoreOperation::Read, false)]
    fn constructors_record_operation_and_payload(
        #[case] descriptor: PermissionErrorDescriptor,
        #[case] operation: StoreOperation,
        #[case] has_payload: bool,
    ) {
        assert_eq!(descriptor.operation(), operation);
        assert_eq!(descriptor.request_resource_data().is_some(), has_payload);
    }

    #[test]
    fn serialises_with_camel_case_payload_key() {
        let descriptor = PermissionErrorDescriptor::for_create("staff/s1", json!({ "name": "Ann" }));
        let value = serde_json::to_value(&descriptor).expect("serialise");
        assert_eq!(
            value,
            json!({
                "path": "staff/s1",
                "operation": "create",
                "requestResourceData": { "name": "Ann" },
            })
        );
    }

    #[test]
    fn omits_payload_for_deletes() {
        let value =
            serde_json::to_value(PermissionErrorDescriptor::for_delete("staff/s1")).expect("serialise");
        assert_eq!(value, json!({ "path": "staff/s1", "operation": "delete" }));
    }

    #[test]
    fn display_embeds_request_context() {
        let descriptor = PermissionErrorDescriptor::for_update("patients/p1", json!({ "ward": 3 }));
        let rendered = descriptor.to_string();
        assert!(rendered.starts_with("Missing or insufficient permissions"));
        assert!(rendered.contains("\"method\": \"update\""));
        assert!(rendered.contains("/databases/(default)/documents/patients/p1"));
        assert!(rendered.contains("\"ward\": 3"));
    }
}
