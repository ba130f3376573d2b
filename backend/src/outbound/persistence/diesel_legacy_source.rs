//! Read-only adapter over the legacy wide signup table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{LegacySignup, LegacySignupSource, LegacySourceError};

use super::diesel_helpers::{DieselErrorClass, classify_diesel_error, pool_error_message};
use super::models::LegacySignupRow;
use super::pool::{DbPool, PoolError};
use super::schema::legacy_signups;

/// Diesel-backed implementation of the `LegacySignupSource` port.
///
/// The table belongs to the system being replaced and is absent on fresh
/// installs, so "relation does not exist" is a normal answer here, reported
/// as `Ok(None)` rather than an error.
#[derive(Clone)]
pub struct DieselLegacySignupSource {
    pool: DbPool,
}

impl DieselLegacySignupSource {
    /// Create a new source with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LegacySourceError {
    LegacySourceError::connection(pool_error_message(error))
}

fn row_to_signup(row: LegacySignupRow) -> LegacySignup {
    LegacySignup {
        legacy_user_id: row.user_id,
        email: row.email,
        phone: row.phone,
        first_name: row.first_name,
        last_name: row.last_name,
        license_plate: row.license_plate,
        vin: row.vin,
        year: row.year,
        make: row.make,
        model: row.model,
        zip_code: row.zip_code,
        mailing_address: row.mailing_address,
        mailing_city: row.mailing_city,
        mailing_state: row.mailing_state,
        mailing_zip: row.mailing_zip,
        subscription_id: row.subscription_id,
        subscription_status: row.subscription_status,
        city_sticker_expiry: row.city_sticker_expiry,
        license_plate_expiry: row.license_plate_expiry,
        emissions_due_date: row.emissions_date,
    }
}

#[async_trait]
impl LegacySignupSource for DieselLegacySignupSource {
    async fn fetch_all(&self) -> Result<Option<Vec<LegacySignup>>, LegacySourceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Result<Vec<LegacySignupRow>, _> = legacy_signups::table
            .order(legacy_signups::id.asc())
            .select(LegacySignupRow::as_select())
            .load(&mut conn)
            .await;

        match result {
            Ok(rows) => Ok(Some(rows.into_iter().map(row_to_signup).collect())),
            Err(error) => match classify_diesel_error(error) {
                DieselErrorClass::UndefinedTable { message } => {
                    debug!(message, "legacy table absent, treating as fresh install");
                    Ok(None)
                }
                DieselErrorClass::Connection { message } => {
                    Err(LegacySourceError::connection(message))
                }
                DieselErrorClass::UniqueViolation { message }
                | DieselErrorClass::ForeignKeyViolation { message }
                | DieselErrorClass::Query { message } => Err(LegacySourceError::query(message)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the row mapping.
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    fn row_maps_field_for_field() {
        let row = LegacySignupRow {
            id: 42,
            user_id: Some("0b0e9a3c-1111-2222-3333-444455556666".to_owned()),
            email: Some("ada@example.com".to_owned()),
            phone: None,
            first_name: Some("Ada".to_owned()),
            last_name: Some("Lovelace".to_owned()),
            license_plate: Some("AB1234".to_owned()),
            vin: None,
            year: Some(2019),
            make: None,
            model: None,
            zip_code: Some("60614".to_owned()),
            mailing_address: None,
            mailing_city: None,
            mailing_state: None,
            mailing_zip: None,
            subscription_id: None,
            subscription_status: Some("active".to_owned()),
            city_sticker_expiry: NaiveDate::from_ymd_opt(2025, 6, 30),
            license_plate_expiry: None,
            emissions_date: NaiveDate::from_ymd_opt(2025, 9, 1),
        };
        let signup = row_to_signup(row);
        assert_eq!(
            signup.legacy_user_id.as_deref(),
            Some("0b0e9a3c-1111-2222-3333-444455556666")
        );
        assert_eq!(signup.emissions_due_date, NaiveDate::from_ymd_opt(2025, 9, 1));
        assert_eq!(signup.license_plate.as_deref(), Some("AB1234"));
    }
}
