//! Port for vehicle persistence.

use async_trait::async_trait;

use crate::domain::{LicensePlate, NewVehicle, UserId, Vehicle};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vehicle repository adapters.
    pub enum VehicleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "vehicle repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "vehicle repository query failed: {message}",
        /// The (user, plate) uniqueness constraint rejected an insert.
        DuplicatePlate { plate: String } =>
            "plate {plate} is already registered for this user",
        /// The referenced owner does not exist.
        UnknownUser { message: String } =>
            "vehicle references an unknown user: {message}",
    }
}

/// Port for vehicle storage and lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Register a vehicle.
    ///
    /// Fails with [`VehicleRepositoryError::DuplicatePlate`] when the owner
    /// already has a vehicle under the same plate.
    async fn create(&self, vehicle: &NewVehicle) -> Result<Vehicle, VehicleRepositoryError>;

    /// Fetch a vehicle by its (owner, plate) business key.
    async fn find_by_plate(
        &self,
        user_id: UserId,
        plate: &LicensePlate,
    ) -> Result<Option<Vehicle>, VehicleRepositoryError>;
}
