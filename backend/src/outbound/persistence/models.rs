//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{legacy_signups, obligations, reminders, users, vehicles};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub notification_preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
///
/// `notification_preferences` stays `None` to let the column default apply.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub notification_preferences: Option<serde_json::Value>,
}

/// Changeset for partial user updates; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub phone: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub notification_preferences: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

/// Row struct for reading from the vehicles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vehicles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VehicleRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub license_plate: String,
    pub vin: Option<String>,
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub zip_code: Option<String>,
    pub mailing_address: Option<String>,
    pub mailing_city: Option<String>,
    pub mailing_state: Option<String>,
    pub mailing_zip: Option<String>,
    pub subscription_id: Option<String>,
    pub subscription_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for registering vehicles.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vehicles)]
pub(crate) struct NewVehicleRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub license_plate: &'a str,
    pub vin: Option<&'a str>,
    pub year: Option<i32>,
    pub make: Option<&'a str>,
    pub model: Option<&'a str>,
    pub zip_code: Option<&'a str>,
    pub mailing_address: Option<&'a str>,
    pub mailing_city: Option<&'a str>,
    pub mailing_state: Option<&'a str>,
    pub mailing_zip: Option<&'a str>,
    pub subscription_id: Option<&'a str>,
    pub subscription_status: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Obligations
// ---------------------------------------------------------------------------

/// Row struct for reading from the obligations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = obligations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ObligationRow {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub due_date: NaiveDate,
    pub auto_renew_enabled: bool,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for recording deadlines.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = obligations)]
pub(crate) struct NewObligationRow<'a> {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub kind: &'a str,
    pub due_date: NaiveDate,
    pub auto_renew_enabled: bool,
    pub notes: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Reminders
// ---------------------------------------------------------------------------

/// Row struct for reading from the reminders table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reminders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReminderRow {
    pub id: Uuid,
    pub obligation_id: Uuid,
    pub user_id: Uuid,
    pub sent_at: DateTime<Utc>,
    pub method: String,
    pub days_until_due: i32,
    pub status: String,
    pub error_message: Option<String>,
}

/// Insertable struct for appending reminder log entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reminders)]
pub(crate) struct NewReminderRow<'a> {
    pub id: Uuid,
    pub obligation_id: Uuid,
    pub user_id: Uuid,
    pub sent_at: DateTime<Utc>,
    pub method: &'a str,
    pub days_until_due: i32,
    pub status: &'a str,
    pub error_message: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Legacy signups (read-only)
// ---------------------------------------------------------------------------

/// Row struct for reading the legacy wide table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = legacy_signups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LegacySignupRow {
    #[expect(dead_code, reason = "primary key only drives the stable read order")]
    pub id: i32,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub license_plate: Option<String>,
    pub vin: Option<String>,
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub zip_code: Option<String>,
    pub mailing_address: Option<String>,
    pub mailing_city: Option<String>,
    pub mailing_state: Option<String>,
    pub mailing_zip: Option<String>,
    pub subscription_id: Option<String>,
    pub subscription_status: Option<String>,
    pub city_sticker_expiry: Option<NaiveDate>,
    pub license_plate_expiry: Option<NaiveDate>,
    pub emissions_date: Option<NaiveDate>,
}
