//! PostgreSQL-backed `ReminderRepository` implementation using Diesel.
//!
//! Inserts into an append-only table guarded by a unique expression index on
//! (obligation, lead time, UTC calendar day). A unique violation here means
//! a concurrent dispatch run already logged the attempt.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ReminderRepository, ReminderRepositoryError};
use crate::domain::{
    NewReminder, Reminder, ReminderId, ReminderMethod, ReminderStatus, UserId,
};
use crate::domain::{ObligationId, reminder::ParseReminderFieldError};

use super::diesel_helpers::{DieselErrorClass, classify_diesel_error, pool_error_message};
use super::models::{NewReminderRow, ReminderRow};
use super::pool::{DbPool, PoolError};
use super::schema::reminders;

/// Diesel-backed implementation of the `ReminderRepository` port.
#[derive(Clone)]
pub struct DieselReminderRepository {
    pool: DbPool,
}

impl DieselReminderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReminderRepositoryError {
    ReminderRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ReminderRepositoryError {
    match classify_diesel_error(error) {
        DieselErrorClass::UniqueViolation { message } => {
            ReminderRepositoryError::duplicate_dispatch(message)
        }
        DieselErrorClass::ForeignKeyViolation { message } => {
            ReminderRepositoryError::unknown_reference(message)
        }
        DieselErrorClass::Connection { message } => ReminderRepositoryError::connection(message),
        DieselErrorClass::UndefinedTable { message } | DieselErrorClass::Query { message } => {
            ReminderRepositoryError::query(message)
        }
    }
}

/// Convert a stored reminder row to the domain entity.
fn row_to_reminder(row: ReminderRow) -> Result<Reminder, String> {
    let method: ReminderMethod = row
        .method
        .parse()
        .map_err(|error: ParseReminderFieldError| error.to_string())?;
    let status: ReminderStatus = row
        .status
        .parse()
        .map_err(|error: ParseReminderFieldError| error.to_string())?;
    let days_until_due = u16::try_from(row.days_until_due)
        .map_err(|_| format!("stored days_until_due {} out of range", row.days_until_due))?;
    Ok(Reminder {
        id: ReminderId::from_uuid(row.id),
        obligation_id: ObligationId::from_uuid(row.obligation_id),
        user_id: UserId::from_uuid(row.user_id),
        sent_at: row.sent_at,
        method,
        days_until_due,
        status,
        error_message: row.error_message,
    })
}

#[async_trait]
impl ReminderRepository for DieselReminderRepository {
    async fn append(&self, reminder: &NewReminder) -> Result<Reminder, ReminderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewReminderRow {
            id: Uuid::new_v4(),
            obligation_id: *reminder.obligation_id.as_uuid(),
            user_id: *reminder.user_id.as_uuid(),
            sent_at: reminder.sent_at,
            method: reminder.method.as_str(),
            days_until_due: i32::from(reminder.days_until_due),
            status: reminder.status.as_str(),
            error_message: reminder.error_message.as_deref(),
        };

        let row: ReminderRow = diesel::insert_into(reminders::table)
            .values(&new_row)
            .returning(ReminderRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_reminder(row).map_err(ReminderRepositoryError::query)
    }
}
