//! Scheduled reminder dispatch for one lead time.
//!
//! A run is idempotent per calendar day: eligibility excludes obligations
//! that already have a log entry for (obligation, lead time, today), so
//! re-running after a crash or overlap sends nothing twice. Failed delivery
//! attempts are logged with `status = failed` and block same-day retries;
//! the next day's run picks them up again if the obligation is still open.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info, warn};

use super::error::{LedgerError, LedgerResult};
use super::ports::{
    NotificationGateway, ObligationRepository, ReminderNotice, ReminderRepository,
    ReminderRepositoryError,
};
use super::reminder::{NewReminder, ReminderStatus};
use super::views::DueObligation;

/// Tally of one dispatch run at a single lead time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub lead_days: u16,
    /// Eligible obligations returned by the due-date query.
    pub examined: usize,
    pub sent: usize,
    /// Delivery attempts that failed and were logged as such.
    pub failed: usize,
    /// Appends rejected by the dispatch guard: a concurrent run got there
    /// first.
    pub already_sent: usize,
    /// Users with every notification channel disabled.
    pub skipped_no_channel: usize,
}

/// Sends due reminders and records every attempt in the append-only log.
pub struct ReminderDispatchService<O, R, G> {
    obligations: Arc<O>,
    reminders: Arc<R>,
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<O, R, G> ReminderDispatchService<O, R, G>
where
    O: ObligationRepository,
    R: ReminderRepository,
    G: NotificationGateway,
{
    pub fn new(
        obligations: Arc<O>,
        reminders: Arc<R>,
        gateway: Arc<G>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            obligations,
            reminders,
            gateway,
            clock,
        }
    }

    /// Dispatch reminders for every open obligation due exactly `lead_days`
    /// from today.
    ///
    /// Delivery failures are recorded and counted, never fatal; only storage
    /// failures abort the run.
    pub async fn run(&self, lead_days: u16) -> LedgerResult<DispatchReport> {
        let today = self.clock.utc().date_naive();
        let due = self
            .obligations
            .due_needing_reminder(lead_days, today)
            .await
            .map_err(|error| LedgerError::storage(error.to_string()))?;

        let mut report = DispatchReport {
            lead_days,
            examined: due.len(),
            ..DispatchReport::default()
        };
        for obligation in due {
            self.dispatch_one(&obligation, lead_days, &mut report)
                .await?;
        }

        info!(
            lead_days,
            examined = report.examined,
            sent = report.sent,
            failed = report.failed,
            already_sent = report.already_sent,
            skipped_no_channel = report.skipped_no_channel,
            "reminder dispatch finished"
        );
        Ok(report)
    }

    async fn dispatch_one(
        &self,
        obligation: &DueObligation,
        lead_days: u16,
        report: &mut DispatchReport,
    ) -> LedgerResult<()> {
        let Some(method) = obligation.preferences.preferred_method() else {
            debug!(
                obligation_id = %obligation.id,
                user_id = %obligation.user_id,
                "every channel disabled, skipping user"
            );
            report.skipped_no_channel += 1;
            return Ok(());
        };

        let notice = ReminderNotice {
            obligation_id: obligation.id,
            user_id: obligation.user_id,
            method,
            email: obligation.email.clone(),
            phone: obligation.phone.clone(),
            kind: obligation.kind,
            license_plate: obligation.license_plate.clone(),
            due_date: obligation.due_date,
            days_until_due: lead_days,
        };
        let (status, error_message) = match self.gateway.send(&notice).await {
            Ok(()) => (ReminderStatus::Sent, None),
            Err(error) => {
                warn!(
                    obligation_id = %obligation.id,
                    %method,
                    error = %error,
                    "delivery failed, logging the attempt"
                );
                (ReminderStatus::Failed, Some(error.to_string()))
            }
        };

        let entry = NewReminder {
            obligation_id: obligation.id,
            user_id: obligation.user_id,
            sent_at: self.clock.utc(),
            method,
            days_until_due: lead_days,
            status,
            error_message,
        };
        match self.reminders.append(&entry).await {
            Ok(_) => match status {
                ReminderStatus::Sent => report.sent += 1,
                _ => report.failed += 1,
            },
            Err(ReminderRepositoryError::DuplicateDispatch { .. }) => {
                // Another run logged this (obligation, lead time, day) first.
                report.already_sent += 1;
            }
            Err(error) => return Err(LedgerError::storage(error.to_string())),
        }
        Ok(())
    }
}
