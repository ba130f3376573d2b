//! Port over the legacy denormalised signup table.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::define_port_error;

define_port_error! {
    /// Errors raised by legacy source adapters.
    pub enum LegacySourceError {
        /// Source connection could not be established.
        Connection { message: String } =>
            "legacy source connection failed: {message}",
        /// Reading the legacy table failed.
        Query { message: String } =>
            "legacy source query failed: {message}",
    }
}

/// One row of the legacy wide table: user contact info, one vehicle, and up
/// to three obligation due dates, all denormalised into a single record.
///
/// Everything is optional and unvalidated; the importer owns validation and
/// tags rows that fail it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacySignup {
    /// Legacy account identifier; rows whose value parses as a UUID win the
    /// canonical-row tie-break during deduplication.
    pub legacy_user_id: Option<String>,
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
    pub emissions_due_date: Option<NaiveDate>,
}

/// Port for reading the legacy signup table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LegacySignupSource: Send + Sync {
    /// Fetch every legacy row in stable input order.
    ///
    /// Returns `Ok(None)` when the legacy table does not exist — a fresh
    /// install, not an error. The importer then skips all migration steps.
    async fn fetch_all(&self) -> Result<Option<Vec<LegacySignup>>, LegacySourceError>;
}
