//! Port for the append-only reminder log.

use async_trait::async_trait;

use crate::domain::{NewReminder, Reminder};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reminder repository adapters.
    pub enum ReminderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "reminder repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "reminder repository query failed: {message}",
        /// The dispatch guard rejected the append: a reminder for this
        /// (obligation, lead time, calendar day) already exists, so a
        /// concurrent scheduler run won the race.
        DuplicateDispatch { message: String } =>
            "reminder already dispatched: {message}",
        /// The referenced obligation or user does not exist.
        UnknownReference { message: String } =>
            "reminder references a missing row: {message}",
    }
}

/// Port for appending reminder log entries.
///
/// Pure append: rows are never updated or deleted. Semantic duplicates are
/// prevented upstream by eligibility plus the storage-level dispatch guard;
/// [`ReminderRepositoryError::DuplicateDispatch`] is the guard firing under
/// a race, not a caller bug.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Append one reminder log entry and return the stored row.
    async fn append(&self, reminder: &NewReminder) -> Result<Reminder, ReminderRepositoryError>;
}
