//! Acting user identity.
//!
//! Identities are issued by the upstream authentication provider; this crate
//! only checks that they are usable as a document-store path segment, since
//! user ids key `users/{uid}` and `roles_admin/{uid}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::paths::{PathValidationError, validate_segment};

/// Validation errors returned by [`UserId::new`].
pub type UserValidationError = PathValidationError;

/// Opaque user identifier issued by the authentication provider.
///
/// # Examples
/// ```
/// use carehub::domain::UserId;
///
/// let id = UserId::new("x7Jq2").expect("valid id");
/// assert_eq!(id.as_ref(), "x7Jq2");
/// assert!(UserId::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        validate_segment(&id)?;
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}
