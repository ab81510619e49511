//! Driving port for role lookups.

use async_trait::async_trait;

use crate::domain::{Role, RoleBasis, RoleResolution, UserId};

/// Driving port answering "is this user elevated?".
///
/// The lookup cannot fail: faults resolve to [`Role::Standard`] with
/// [`RoleBasis::LookupFailed`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleQuery: Send + Sync {
    /// Resolve the role of `user`, or of an anonymous caller.
    async fn resolve_role(&self, user: Option<UserId>) -> RoleResolution;
}

/// Fixture query that treats every caller as standard.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRoleQuery;

#[async_trait]
impl RoleQuery for FixtureRoleQuery {
    async fn resolve_role(&self, user: Option<UserId>) -> RoleResolution {
        RoleResolution {
            role: Role::Standard,
            basis: match user {
                Some(_) => RoleBasis::MarkerAbsent,
                None => RoleBasis::Anonymous,
            },
        }
    }
}
