//! Notification delivery adapters.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{NotificationGateway, NotificationGatewayError, ReminderNotice};

/// Gateway that records each notice in the log instead of delivering it.
///
/// Stands in until a real email/SMS provider adapter is wired up; useful
/// as-is for dry runs and local development because the dispatch pipeline
/// (eligibility, logging, idempotency) behaves exactly as in production.
#[derive(Debug, Clone, Default)]
pub struct LogOnlyGateway;

#[async_trait]
impl NotificationGateway for LogOnlyGateway {
    async fn send(&self, notice: &ReminderNotice) -> Result<(), NotificationGatewayError> {
        info!(
            obligation_id = %notice.obligation_id,
            user_id = %notice.user_id,
            method = %notice.method,
            kind = %notice.kind,
            license_plate = %notice.license_plate,
            due_date = %notice.due_date,
            days_until_due = notice.days_until_due,
            "reminder notice (log-only delivery)"
        );
        Ok(())
    }
}
