//! Vehicle entity and plate value type.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Validation errors raised by vehicle value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VehicleValidationError {
    #[error("license plate must not be empty")]
    EmptyPlate,
    #[error("license plate {plate:?} exceeds {max} characters")]
    PlateTooLong { plate: String, max: usize },
}

/// Stable vehicle identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleId(Uuid);

impl VehicleId {
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

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Maximum stored plate length, matching the schema column.
pub const LICENSE_PLATE_MAX: usize = 16;

/// A license plate as registered, trimmed and upper-cased.
///
/// (user, plate) is the vehicle business key: the importer and the conflict
/// rules both depend on this normalisation being applied exactly once, here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicensePlate(String);

impl LicensePlate {
    /// Validate and construct a [`LicensePlate`].
    pub fn new(plate: impl Into<String>) -> Result<Self, VehicleValidationError> {
        let plate = plate.into();
        let normalised = plate.trim().to_uppercase();
        if normalised.is_empty() {
            return Err(VehicleValidationError::EmptyPlate);
        }
        if normalised.chars().count() > LICENSE_PLATE_MAX {
            return Err(VehicleValidationError::PlateTooLong {
                plate: normalised,
                max: LICENSE_PLATE_MAX,
            });
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for LicensePlate {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for LicensePlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<LicensePlate> for String {
    fn from(value: LicensePlate) -> Self {
        value.0
    }
}

impl TryFrom<String> for LicensePlate {
    type Error = VehicleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Postal address used for mailed correspondence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailingAddress {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// A registered vehicle, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub user_id: UserId,
    pub license_plate: LicensePlate,
    pub vin: Option<String>,
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub zip_code: Option<String>,
    pub mailing: MailingAddress,
    pub subscription_id: Option<String>,
    pub subscription_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for registering a vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVehicle {
    pub user_id: UserId,
    pub license_plate: LicensePlate,
    pub vin: Option<String>,
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub zip_code: Option<String>,
    pub mailing: MailingAddress,
    pub subscription_id: Option<String>,
    pub subscription_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc 1234", "ABC 1234")]
    #[case("  cd5678  ", "CD5678")]
    fn plates_are_trimmed_and_upper_cased(#[case] raw: &str, #[case] expected: &str) {
        let plate = LicensePlate::new(raw).expect("valid plate");
        assert_eq!(plate.as_ref(), expected);
    }

    #[rstest]
    fn empty_plate_is_rejected() {
        assert_eq!(
            LicensePlate::new("   "),
            Err(VehicleValidationError::EmptyPlate)
        );
    }

    #[rstest]
    fn oversized_plate_is_rejected() {
        let raw = "A".repeat(LICENSE_PLATE_MAX + 1);
        assert!(matches!(
            LicensePlate::new(raw),
            Err(VehicleValidationError::PlateTooLong { .. })
        ));
    }

    #[rstest]
    fn same_plate_different_case_normalises_to_one_key() {
        let a = LicensePlate::new("ab1234").expect("valid plate");
        let b = LicensePlate::new("AB1234").expect("valid plate");
        assert_eq!(a, b);
    }
}
