//! PostgreSQL-backed `VehicleRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{VehicleRepository, VehicleRepositoryError};
use crate::domain::{LicensePlate, MailingAddress, NewVehicle, UserId, Vehicle, VehicleId};

use super::diesel_helpers::{DieselErrorClass, classify_diesel_error, pool_error_message};
use super::models::{NewVehicleRow, VehicleRow};
use super::pool::{DbPool, PoolError};
use super::schema::vehicles;

/// Diesel-backed implementation of the `VehicleRepository` port.
#[derive(Clone)]
pub struct DieselVehicleRepository {
    pool: DbPool,
}

impl DieselVehicleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> VehicleRepositoryError {
    VehicleRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> VehicleRepositoryError {
    match classify_diesel_error(error) {
        DieselErrorClass::Connection { message } => VehicleRepositoryError::connection(message),
        DieselErrorClass::UniqueViolation { message }
        | DieselErrorClass::ForeignKeyViolation { message }
        | DieselErrorClass::UndefinedTable { message }
        | DieselErrorClass::Query { message } => VehicleRepositoryError::query(message),
    }
}

/// Map insert errors: the unique constraint is (user, plate), the foreign
/// key is the owning user.
fn map_insert_error(
    error: diesel::result::Error,
    plate: &LicensePlate,
) -> VehicleRepositoryError {
    match classify_diesel_error(error) {
        DieselErrorClass::UniqueViolation { .. } => {
            VehicleRepositoryError::duplicate_plate(plate.as_ref())
        }
        DieselErrorClass::ForeignKeyViolation { message } => {
            VehicleRepositoryError::unknown_user(message)
        }
        DieselErrorClass::Connection { message } => VehicleRepositoryError::connection(message),
        DieselErrorClass::UndefinedTable { message } | DieselErrorClass::Query { message } => {
            VehicleRepositoryError::query(message)
        }
    }
}

/// Convert a database row to a domain vehicle.
fn row_to_vehicle(row: VehicleRow) -> Result<Vehicle, String> {
    let license_plate = LicensePlate::new(row.license_plate)
        .map_err(|error| format!("stored plate failed validation: {error}"))?;
    Ok(Vehicle {
        id: VehicleId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        license_plate,
        vin: row.vin,
        year: row.year,
        make: row.make,
        model: row.model,
        zip_code: row.zip_code,
        mailing: MailingAddress {
            address: row.mailing_address,
            city: row.mailing_city,
            state: row.mailing_state,
            zip: row.mailing_zip,
        },
        subscription_id: row.subscription_id,
        subscription_status: row.subscription_status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl VehicleRepository for DieselVehicleRepository {
    async fn create(&self, vehicle: &NewVehicle) -> Result<Vehicle, VehicleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewVehicleRow {
            id: Uuid::new_v4(),
            user_id: *vehicle.user_id.as_uuid(),
            license_plate: vehicle.license_plate.as_ref(),
            vin: vehicle.vin.as_deref(),
            year: vehicle.year,
            make: vehicle.make.as_deref(),
            model: vehicle.model.as_deref(),
            zip_code: vehicle.zip_code.as_deref(),
            mailing_address: vehicle.mailing.address.as_deref(),
            mailing_city: vehicle.mailing.city.as_deref(),
            mailing_state: vehicle.mailing.state.as_deref(),
            mailing_zip: vehicle.mailing.zip.as_deref(),
            subscription_id: vehicle.subscription_id.as_deref(),
            subscription_status: vehicle.subscription_status.as_deref(),
        };

        let row: VehicleRow = diesel::insert_into(vehicles::table)
            .values(&new_row)
            .returning(VehicleRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|error| map_insert_error(error, &vehicle.license_plate))?;

        row_to_vehicle(row).map_err(VehicleRepositoryError::query)
    }

    async fn find_by_plate(
        &self,
        user_id: UserId,
        plate: &LicensePlate,
    ) -> Result<Option<Vehicle>, VehicleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<VehicleRow> = vehicles::table
            .filter(
                vehicles::user_id
                    .eq(user_id.as_uuid())
                    .and(vehicles::license_plate.eq(plate.as_ref())),
            )
            .select(VehicleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_vehicle)
            .transpose()
            .map_err(VehicleRepositoryError::query)
    }
}
