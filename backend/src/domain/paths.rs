//! Document-store identifiers and paths.
//!
//! Paths alternate collection and document segments, starting with a
//! collection: `patients` is a collection, `patients/p1` a document,
//! `patients/p1/sleepLogs` a nested collection. Collection paths therefore
//! carry an odd number of segments and document paths an even number.
//!
//! The free functions at the bottom of this module spell out the store
//! layout used by the application so no call site formats paths by hand.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::UserId;

/// Longest identifier the store accepts, in bytes.
pub const SEGMENT_MAX_BYTES: usize = 1500;

/// Validation errors for identifiers and paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathValidationError {
    /// A segment was empty.
    #[error("path segments must not be empty")]
    EmptySegment,
    /// A segment contained a `/`.
    #[error("path segment {segment:?} must not contain '/'")]
    ContainsSlash {
        /// Offending segment.
        segment: String,
    },
    /// A segment had leading or trailing whitespace.
    #[error("path segment {segment:?} must not have surrounding whitespace")]
    SurroundingWhitespace {
        /// Offending segment.
        segment: String,
    },
    /// A segment used a name the store reserves.
    #[error("path segment {segment:?} is reserved")]
    Reserved {
        /// Offending segment.
        segment: String,
    },
    /// A segment exceeded [`SEGMENT_MAX_BYTES`].
    #[error("path segment exceeds {max} bytes")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// A collection path had an even number of segments.
    #[error("collection path {path:?} must have an odd number of segments")]
    NotACollection {
        /// Offending path.
        path: String,
    },
    /// A document path had an odd number of segments.
    #[error("document path {path:?} must have an even number of segments")]
    NotADocument {
        /// Offending path.
        path: String,
    },
}

pub(crate) fn validate_segment(segment: &str) -> Result<(), PathValidationError> {
    if segment.is_empty() {
        return Err(PathValidationError::EmptySegment);
    }
    if segment.contains('/') {
        return Err(PathValidationError::ContainsSlash {
            segment: segment.to_owned(),
        });
    }
    if segment.trim() != segment {
        return Err(PathValidationError::SurroundingWhitespace {
            segment: segment.to_owned(),
        });
    }
    let reserved_dunder = segment.len() >= 4 && segment.starts_with("__") && segment.ends_with("__");
    if segment == "." || segment == ".." || reserved_dunder {
        return Err(PathValidationError::Reserved {
            segment: segment.to_owned(),
        });
    }
    if segment.len() > SEGMENT_MAX_BYTES {
        return Err(PathValidationError::TooLong {
            max: SEGMENT_MAX_BYTES,
        });
    }
    Ok(())
}

fn parse_segments(path: &str) -> Result<Vec<String>, PathValidationError> {
    path.split('/')
        .map(|segment| validate_segment(segment).map(|()| segment.to_owned()))
        .collect()
}

/// Identifier of a single document within its collection.
///
/// # Examples
/// ```
/// use carehub::domain::DocumentId;
///
/// let id = DocumentId::new("p-42").expect("valid id");
/// assert_eq!(id.as_ref(), "p-42");
/// assert!(DocumentId::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Validate and construct a [`DocumentId`].
    pub fn new(id: impl Into<String>) -> Result<Self, PathValidationError> {
        let id = id.into();
        validate_segment(&id)?;
        Ok(Self(id))
    }

    /// Generate a random identifier for a new document.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = PathValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Path to a collection, such as `patients` or `users/u1/notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(Vec<String>);

impl CollectionPath {
    /// Top-level collection.
    pub fn root(name: &str) -> Result<Self, PathValidationError> {
        validate_segment(name)?;
        Ok(Self(vec![name.to_owned()]))
    }

    /// Parse a slash-separated collection path.
    ///
    /// # Examples
    /// ```
    /// use carehub::domain::CollectionPath;
    ///
    /// let path = CollectionPath::parse("patients/p1/sleepLogs").expect("valid path");
    /// assert_eq!(path.to_string(), "patients/p1/sleepLogs");
    /// assert!(CollectionPath::parse("patients/p1").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self, PathValidationError> {
        let segments = parse_segments(path)?;
        if segments.len().is_multiple_of(2) {
            return Err(PathValidationError::NotACollection {
                path: path.to_owned(),
            });
        }
        Ok(Self(segments))
    }

    /// Document with the given id inside this collection.
    #[must_use]
    pub fn doc(&self, id: &DocumentId) -> DocumentPath {
        let mut segments = self.0.clone();
        segments.push(id.as_ref().to_owned());
        DocumentPath(segments)
    }

    /// Final segment naming the collection.
    pub fn name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// Document this collection is nested under, if any.
    #[must_use]
    pub fn parent(&self) -> Option<DocumentPath> {
        let (_, parent) = self.0.split_last()?;
        (!parent.is_empty()).then(|| DocumentPath(parent.to_vec()))
    }

    /// Whether `document` lives directly inside this collection.
    pub fn contains(&self, document: &DocumentPath) -> bool {
        document.collection() == *self
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Path to a document, such as `patients/p1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath(Vec<String>);

impl DocumentPath {
    /// Parse a slash-separated document path.
    pub fn parse(path: &str) -> Result<Self, PathValidationError> {
        let segments = parse_segments(path)?;
        if !segments.len().is_multiple_of(2) {
            return Err(PathValidationError::NotADocument {
                path: path.to_owned(),
            });
        }
        Ok(Self(segments))
    }

    /// Identifier of the document within its collection.
    pub fn id(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// Identifier of the document as a typed id.
    #[must_use]
    pub fn document_id(&self) -> DocumentId {
        DocumentId(self.id().to_owned())
    }

    /// Collection that holds this document.
    #[must_use]
    pub fn collection(&self) -> CollectionPath {
        let parent = self.0.split_last().map_or(&[][..], |(_, parent)| parent);
        CollectionPath(parent.to_vec())
    }

    /// Sub-collection nested under this document.
    pub fn child(&self, name: &str) -> Result<CollectionPath, PathValidationError> {
        validate_segment(name)?;
        let mut segments = self.0.clone();
        segments.push(name.to_owned());
        Ok(CollectionPath(segments))
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

const PATIENTS: &str = "patients";
const STAFF: &str = "staff";
const USERS: &str = "users";
const NOTIFICATIONS: &str = "notifications";
const ADMIN_ROLES: &str = "roles_admin";

fn top_level(name: &str) -> CollectionPath {
    CollectionPath(vec![name.to_owned()])
}

fn nested(parent: &DocumentPath, name: &str) -> CollectionPath {
    let mut segments = parent.0.clone();
    segments.push(name.to_owned());
    CollectionPath(segments)
}

/// `patients`
#[must_use]
pub fn patients() -> CollectionPath {
    top_level(PATIENTS)
}

/// `patients/{id}`
#[must_use]
pub fn patient(id: &DocumentId) -> DocumentPath {
    patients().doc(id)
}

/// `patients/{id}/{dailyRecords|behaviorEvents|sleepLogs}`
#[must_use]
pub fn care_entries(patient_id: &DocumentId, kind: crate::domain::CareEntryKind) -> CollectionPath {
    nested(&patient(patient_id), kind.collection_name())
}

/// `staff`
#[must_use]
pub fn staff() -> CollectionPath {
    top_level(STAFF)
}

/// `staff/{id}`
#[must_use]
pub fn staff_member(id: &DocumentId) -> DocumentPath {
    staff().doc(id)
}

/// `users`
#[must_use]
pub fn users() -> CollectionPath {
    top_level(USERS)
}

/// `users/{uid}`
#[must_use]
pub fn user(uid: &UserId) -> DocumentPath {
    DocumentPath(vec![USERS.to_owned(), uid.as_ref().to_owned()])
}

/// `users/{uid}/notifications`
#[must_use]
pub fn notifications(uid: &UserId) -> CollectionPath {
    nested(&user(uid), NOTIFICATIONS)
}

/// `users/{uid}/notifications/{id}`
#[must_use]
pub fn notification(uid: &UserId, id: &DocumentId) -> DocumentPath {
    notifications(uid).doc(id)
}

/// `roles_admin/{uid}`: the marker whose existence grants elevated access.
#[must_use]
pub fn admin_role_marker(uid: &UserId) -> DocumentPath {
    DocumentPath(vec![ADMIN_ROLES.to_owned(), uid.as_ref().to_owned()])
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::CareEntryKind;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case(" padded")]
    #[case(".")]
    #[case("..")]
    #[case("__reserved__")]
    #[case("a/b")]
    fn rejects_invalid_segments(#[case] raw: &str) {
        assert!(DocumentId::new(raw).is_err(), "{raw:?} should be rejected");
    }

    #[test]
    fn accepts_short_dunder_lookalikes() {
        assert!(DocumentId::new("__").is_ok());
        assert!(DocumentId::new("_x_").is_ok());
    }

    #[test]
    fn rejects_oversized_segments() {
        let raw = "x".repeat(SEGMENT_MAX_BYTES + 1);
        assert_eq!(
            DocumentId::new(raw),
            Err(PathValidationError::TooLong {
                max: SEGMENT_MAX_BYTES
            })
        );
    }

    #[test]
    fn generated_ids_are_unique_and_valid() {
        let first = DocumentId::generate();
        let second = DocumentId::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_ref().len(), 32);
        assert!(DocumentId::new(first.to_string()).is_ok());
    }

    #[rstest]
    #[case("patients", true)]
    #[case("patients/p1", false)]
    #[case("patients/p1/sleepLogs", true)]
    fn collection_paths_need_odd_segments(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(CollectionPath::parse(raw).is_ok(), valid);
        assert_eq!(DocumentPath::parse(raw).is_ok(), !valid);
    }

    #[test]
    fn navigates_between_documents_and_collections() {
        let id = DocumentId::new("p1").expect("id");
        let doc = patient(&id);
        assert_eq!(doc.to_string(), "patients/p1");
        assert_eq!(doc.id(), "p1");
        assert_eq!(doc.collection(), patients());
        assert!(patients().contains(&doc));
        assert!(patients().parent().is_none());

        let logs = care_entries(&id, CareEntryKind::SleepLog);
        assert_eq!(logs.to_string(), "patients/p1/sleepLogs");
        assert_eq!(logs.parent(), Some(doc));
        assert_eq!(logs.name(), "sleepLogs");
    }

    #[test]
    fn lays_out_user_scoped_paths() {
        let uid = UserId::new("uid-7").expect("uid");
        let id = DocumentId::new("n1").expect("id");
        assert_eq!(notifications(&uid).to_string(), "users/uid-7/notifications");
        assert_eq!(
            notification(&uid, &id).to_string(),
            "users/uid-7/notifications/n1"
        );
        assert_eq!(admin_role_marker(&uid).to_string(), "roles_admin/uid-7");
        assert_eq!(staff_member(&id).to_string(), "staff/n1");
        assert_eq!(users().to_string(), "users");
    }
}
