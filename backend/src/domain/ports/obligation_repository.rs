//! Port for obligation persistence and the date-driven read models.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::views::DueObligation;
use crate::domain::{NewObligation, Obligation, ObligationId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by obligation repository adapters.
    pub enum ObligationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "obligation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "obligation repository query failed: {message}",
        /// The (vehicle, kind, due date) uniqueness constraint rejected an
        /// insert.
        DuplicateObligation { message: String } =>
            "obligation already recorded: {message}",
        /// The referenced vehicle or user does not exist.
        UnknownReference { message: String } =>
            "obligation references a missing row: {message}",
        /// The obligation id does not exist.
        NotFound { id: String } =>
            "no obligation with id {id}",
    }
}

/// Port for obligation storage, completion, and due-date queries.
///
/// Every query takes `today` as a parameter rather than consulting the wall
/// clock, so the date arithmetic is reproducible in tests and across retried
/// scheduler runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObligationRepository: Send + Sync {
    /// Record a new deadline.
    ///
    /// Fails with [`ObligationRepositoryError::DuplicateObligation`] when
    /// (vehicle, kind, due date) is already present; the importer treats
    /// that as already-migrated.
    async fn create(
        &self,
        obligation: &NewObligation,
    ) -> Result<Obligation, ObligationRepositoryError>;

    /// Transition an obligation to completed.
    ///
    /// Idempotent: completing an already-completed obligation is a no-op and
    /// preserves the original completion timestamp.
    async fn mark_completed(
        &self,
        id: ObligationId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), ObligationRepositoryError>;

    /// Open obligations with `due_date >= today`, ascending by due date,
    /// joined with owner contact details.
    async fn list_upcoming(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<DueObligation>, ObligationRepositoryError>;

    /// Open obligations with `due_date < today`, ascending by due date (most
    /// overdue first), joined with owner contact details.
    async fn list_overdue(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<DueObligation>, ObligationRepositoryError>;

    /// Open obligations due exactly `today + lead_days` with no reminder row
    /// yet for (obligation, `lead_days`, today's calendar day).
    ///
    /// The existence check deliberately ignores the stored status: a failed
    /// attempt still blocks same-day retries at this lead time and is
    /// retried on the next calendar day.
    async fn due_needing_reminder(
        &self,
        lead_days: u16,
        today: NaiveDate,
    ) -> Result<Vec<DueObligation>, ObligationRepositoryError>;
}
