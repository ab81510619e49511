//! Driving port for notification writes.

use async_trait::async_trait;

use crate::domain::{DocumentId, Error, UserId, paths};

use super::WriteTicket;

/// Driving port for marking notifications read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsCommand: Send + Sync {
    /// Mark one notification read.
    async fn mark_as_read(&self, user: UserId, id: DocumentId) -> Result<WriteTicket, Error>;

    /// Mark every unread notification read in a single batch.
    ///
    /// # Errors
    ///
    /// Fails only when the current notifications cannot be read; a rejected
    /// batch is published on the error event bus.
    async fn mark_all_as_read(&self, user: UserId) -> Result<WriteTicket, Error>;
}

/// Fixture command that accepts every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationsCommand;

#[async_trait]
impl NotificationsCommand for FixtureNotificationsCommand {
    async fn mark_as_read(&self, user: UserId, id: DocumentId) -> Result<WriteTicket, Error> {
        Ok(WriteTicket::new(paths::notification(&user, &id)))
    }

    async fn mark_all_as_read(&self, user: UserId) -> Result<WriteTicket, Error> {
        Ok(WriteTicket::new(paths::notifications(&user)))
    }
}
