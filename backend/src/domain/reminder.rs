//! Reminder log entries: immutable records of notification attempts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::obligation::ObligationId;
use super::user::UserId;

/// Stable reminder identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderId(Uuid);

impl ReminderId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Delivery channel used for one reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderMethod {
    Email,
    Sms,
    Voice,
}

impl ReminderMethod {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Voice => "voice",
        }
    }
}

impl fmt::Display for ReminderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing a stored method or status value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reminder {field} {value:?}")]
pub struct ParseReminderFieldError {
    pub field: &'static str,
    pub value: String,
}

impl FromStr for ReminderMethod {
    type Err = ParseReminderFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "voice" => Ok(Self::Voice),
            other => Err(ParseReminderFieldError {
                field: "method",
                value: other.to_owned(),
            }),
        }
    }
}

/// Outcome of one delivery attempt.
///
/// `Bounced` is recorded by delivery-provider webhooks outside this core;
/// dispatch itself only produces `Sent` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Sent,
    Failed,
    Bounced,
}

impl ReminderStatus {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Bounced => "bounced",
        }
    }
}

impl FromStr for ReminderStatus {
    type Err = ParseReminderFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            "bounced" => Ok(Self::Bounced),
            other => Err(ParseReminderFieldError {
                field: "status",
                value: other.to_owned(),
            }),
        }
    }
}

/// An immutable record that a notification was sent (or attempted).
///
/// Append-only: never updated or deleted, so the table doubles as the audit
/// trail and as the idempotency guard for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: ReminderId,
    pub obligation_id: ObligationId,
    pub user_id: UserId,
    pub sent_at: DateTime<Utc>,
    pub method: ReminderMethod,
    pub days_until_due: u16,
    pub status: ReminderStatus,
    pub error_message: Option<String>,
}

/// Fields for appending one reminder log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub obligation_id: ObligationId,
    pub user_id: UserId,
    pub sent_at: DateTime<Utc>,
    pub method: ReminderMethod,
    pub days_until_due: u16,
    pub status: ReminderStatus,
    pub error_message: Option<String>,
}
