//! User entity, contact value types, and notification preferences.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reminder::ReminderMethod;

/// Lead-time offsets (in days before the due date) applied to new accounts.
pub const DEFAULT_REMINDER_DAYS: [u16; 6] = [30, 14, 7, 3, 1, 0];

/// Validation errors raised by user value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    InvalidEmail { email: String },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail { email } => {
                write!(f, "email {email:?} is not a plausible address")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated email address, stored case-sensitively as entered.
///
/// The legacy importer keys deduplication on this value, so no case folding
/// or other normalisation beyond trimming is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        // A single local@domain split is enough here; deliverability is the
        // delivery provider's problem.
        let plausible = match trimmed.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.'),
            None => false,
        };
        if !plausible {
            return Err(UserValidationError::InvalidEmail {
                email: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn default_email_channel() -> bool {
    true
}

fn default_reminder_days() -> Vec<u16> {
    DEFAULT_REMINDER_DAYS.to_vec()
}

/// Notification channels and lead-time offsets configured per user.
///
/// Serialised shape matches the `notification_preferences` JSONB column:
/// `{"sms": false, "email": true, "voice": false, "reminder_days": [30, 14, 7, 3, 1, 0]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    #[serde(default)]
    pub sms: bool,
    #[serde(default = "default_email_channel")]
    pub email: bool,
    #[serde(default)]
    pub voice: bool,
    #[serde(default = "default_reminder_days")]
    pub reminder_days: Vec<u16>,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            sms: false,
            email: true,
            voice: false,
            reminder_days: default_reminder_days(),
        }
    }
}

impl NotificationPreferences {
    /// Pick the delivery method for a reminder.
    ///
    /// Each reminder row records exactly one method; email is preferred,
    /// then SMS, then voice. Returns `None` when every channel is disabled,
    /// in which case dispatch skips the user.
    pub fn preferred_method(&self) -> Option<ReminderMethod> {
        if self.email {
            Some(ReminderMethod::Email)
        } else if self.sms {
            Some(ReminderMethod::Sms)
        } else if self.voice {
            Some(ReminderMethod::Voice)
        } else {
            None
        }
    }
}

/// A person who registered one or more vehicles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub preferences: NotificationPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: EmailAddress,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `None` falls back to [`NotificationPreferences::default`] on insert.
    pub preferences: Option<NotificationPreferences>,
}

/// Partial update for an existing user. `None` leaves a field unchanged;
/// merging never produces an explicit NULL write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferences: Option<NotificationPreferences>,
}

impl UserUpdate {
    fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.preferences.is_none()
    }
}

impl User {
    /// Merge a canonical legacy row into this user.
    ///
    /// Names and phone are last-write-wins: an incoming non-null value
    /// overwrites, an incoming `None` never clobbers a stored value.
    /// Returns `None` when nothing would change.
    pub fn merged_update(&self, incoming: &NewUser) -> Option<UserUpdate> {
        let update = UserUpdate {
            phone: overwrite(self.phone.as_ref(), incoming.phone.as_ref()),
            first_name: overwrite(self.first_name.as_ref(), incoming.first_name.as_ref()),
            last_name: overwrite(self.last_name.as_ref(), incoming.last_name.as_ref()),
            // Stored preferences always exist (NOT NULL with a default), so
            // legacy rows can never replace them.
            preferences: None,
        };
        (!update.is_empty()).then_some(update)
    }

    /// Merge a non-canonical legacy row: fill-if-null for every field.
    ///
    /// Duplicate legacy rows for one email are expected to carry consistent
    /// values, so later rows only contribute where the canonical row left a
    /// gap.
    pub fn fill_update(&self, incoming: &NewUser) -> Option<UserUpdate> {
        let update = UserUpdate {
            phone: fill_if_null(self.phone.as_ref(), incoming.phone.as_ref()),
            first_name: fill_if_null(self.first_name.as_ref(), incoming.first_name.as_ref()),
            last_name: fill_if_null(self.last_name.as_ref(), incoming.last_name.as_ref()),
            preferences: None,
        };
        (!update.is_empty()).then_some(update)
    }

    /// Apply an update to the in-memory copy, mirroring what the repository
    /// persisted.
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(phone) = &update.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(first_name) = &update.first_name {
            self.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            self.last_name = Some(last_name.clone());
        }
        if let Some(preferences) = &update.preferences {
            self.preferences = preferences.clone();
        }
    }
}

/// Incoming value lands only when the stored value is absent.
fn fill_if_null<T: Clone + PartialEq>(stored: Option<&T>, incoming: Option<&T>) -> Option<T> {
    match (stored, incoming) {
        (None, Some(value)) => Some(value.clone()),
        _ => None,
    }
}

/// Incoming value overwrites unless absent or already equal.
fn overwrite<T: Clone + PartialEq>(stored: Option<&T>, incoming: Option<&T>) -> Option<T> {
    match incoming {
        Some(value) if stored != Some(value) => Some(value.clone()),
        _ => None,
    }
}
