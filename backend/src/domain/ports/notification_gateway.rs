//! Port for the external email/SMS/voice delivery provider.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    EmailAddress, LicensePlate, ObligationId, ObligationKind, ReminderMethod, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by delivery provider adapters.
    pub enum NotificationGatewayError {
        /// The provider rejected or failed the delivery attempt.
        Delivery { message: String } =>
            "delivery failed: {message}",
    }
}

/// Everything a provider adapter needs to render and address one reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderNotice {
    pub obligation_id: ObligationId,
    pub user_id: UserId,
    pub method: ReminderMethod,
    pub email: EmailAddress,
    pub phone: Option<String>,
    pub kind: ObligationKind,
    pub license_plate: LicensePlate,
    pub due_date: NaiveDate,
    pub days_until_due: u16,
}

/// Port for notification delivery.
///
/// A failed send is a recorded outcome for the dispatch service, never an
/// abort: the attempt is logged with `status = failed` and retried on a
/// later calendar day.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Attempt delivery of one reminder.
    async fn send(&self, notice: &ReminderNotice) -> Result<(), NotificationGatewayError>;
}
