//! Due-date read models: upcoming, overdue, and the view service.
//!
//! The repository returns raw joined rows ([`DueObligation`]); annotation
//! with day counts happens here, against an injected "today", so the
//! arithmetic is testable without a live clock or database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;

use super::error::{LedgerError, LedgerResult};
use super::obligation::{ObligationId, ObligationKind};
use super::ports::{ObligationRepository, ObligationRepositoryError, ObligationViews};
use super::user::{EmailAddress, NotificationPreferences, UserId};
use super::vehicle::{LicensePlate, VehicleId};

/// An open obligation joined with the vehicle plate and owner contact info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueObligation {
    pub id: ObligationId,
    pub vehicle_id: VehicleId,
    pub user_id: UserId,
    pub kind: ObligationKind,
    pub due_date: NaiveDate,
    pub license_plate: LicensePlate,
    pub email: EmailAddress,
    pub phone: Option<String>,
    pub preferences: NotificationPreferences,
}

/// An open obligation due today or later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingObligation {
    pub obligation: DueObligation,
    /// Whole days until the due date; 0 means due today.
    pub days_until_due: i64,
}

/// An open obligation past its due date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueObligation {
    pub obligation: DueObligation,
    /// Whole days past the due date; always positive.
    pub days_overdue: i64,
}

/// Annotate an upcoming row with its day count relative to `today`.
pub fn annotate_upcoming(obligation: DueObligation, today: NaiveDate) -> UpcomingObligation {
    let days_until_due = (obligation.due_date - today).num_days();
    UpcomingObligation {
        obligation,
        days_until_due,
    }
}

/// Annotate an overdue row with its day count relative to `today`.
pub fn annotate_overdue(obligation: DueObligation, today: NaiveDate) -> OverdueObligation {
    let days_overdue = (today - obligation.due_date).num_days();
    OverdueObligation {
        obligation,
        days_overdue,
    }
}

/// Default implementation of the [`ObligationViews`] driving port.
#[derive(Clone)]
pub struct ObligationViewService<O> {
    obligations: Arc<O>,
    clock: Arc<dyn Clock>,
}

impl<O> ObligationViewService<O> {
    /// Create a new service over the given repository and clock.
    pub fn new(obligations: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self { obligations, clock }
    }
}

/// Translate repository failures into the domain taxonomy.
fn map_obligation_error(error: ObligationRepositoryError) -> LedgerError {
    match error {
        ObligationRepositoryError::Connection { message } => LedgerError::storage(message),
        ObligationRepositoryError::Query { message } => LedgerError::storage(message),
        ObligationRepositoryError::DuplicateObligation { message } => {
            LedgerError::conflict(message)
        }
        ObligationRepositoryError::UnknownReference { message } => LedgerError::not_found(message),
        ObligationRepositoryError::NotFound { id } => {
            LedgerError::not_found(format!("no obligation with id {id}"))
        }
    }
}

#[async_trait]
impl<O> ObligationViews for ObligationViewService<O>
where
    O: ObligationRepository,
{
    async fn upcoming(&self) -> LedgerResult<Vec<UpcomingObligation>> {
        let today = self.clock.utc().date_naive();
        let rows = self
            .obligations
            .list_upcoming(today)
            .await
            .map_err(map_obligation_error)?;
        Ok(rows
            .into_iter()
            .map(|row| annotate_upcoming(row, today))
            .collect())
    }

    async fn overdue(&self) -> LedgerResult<Vec<OverdueObligation>> {
        let today = self.clock.utc().date_naive();
        let rows = self
            .obligations
            .list_overdue(today)
            .await
            .map_err(map_obligation_error)?;
        Ok(rows
            .into_iter()
            .map(|row| annotate_overdue(row, today))
            .collect())
    }

    async fn complete(&self, id: ObligationId) -> LedgerResult<()> {
        self.obligations
            .mark_completed(id, self.clock.utc())
            .await
            .map_err(map_obligation_error)
    }
}
