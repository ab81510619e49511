//! Driving port for notification reads.

use async_trait::async_trait;

use crate::domain::{Error, Notification, UserId};

/// Driving port for listing a user's notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsQuery: Send + Sync {
    /// Notifications for `user`, newest first.
    async fn list(&self, user: UserId) -> Result<Vec<Notification>, Error>;
}

/// Fixture query with no notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationsQuery;

#[async_trait]
impl NotificationsQuery for FixtureNotificationsQuery {
    async fn list(&self, _user: UserId) -> Result<Vec<Notification>, Error> {
        Ok(Vec::new())
    }
}
