//! Obligation entity: a single compliance deadline for one vehicle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;
use super::vehicle::VehicleId;

/// Stable obligation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObligationId(Uuid);

impl ObligationId {
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

impl fmt::Display for ObligationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The compliance deadline categories tracked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    CitySticker,
    Emissions,
    LicensePlate,
}

impl ObligationKind {
    /// Every kind, in the order the importer scans legacy date columns.
    pub const ALL: [Self; 3] = [Self::CitySticker, Self::LicensePlate, Self::Emissions];

    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CitySticker => "city_sticker",
            Self::Emissions => "emissions",
            Self::LicensePlate => "license_plate",
        }
    }
}

impl fmt::Display for ObligationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an [`ObligationKind`] from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown obligation kind {value:?}")]
pub struct ParseObligationKindError {
    pub value: String,
}

impl FromStr for ObligationKind {
    type Err = ParseObligationKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "city_sticker" => Ok(Self::CitySticker),
            "emissions" => Ok(Self::Emissions),
            "license_plate" => Ok(Self::LicensePlate),
            other => Err(ParseObligationKindError {
                value: other.to_owned(),
            }),
        }
    }
}

/// A compliance deadline tied to one vehicle (and, redundantly, its owner).
///
/// ## State machine
/// `pending -> completed`, one-way. Completed obligations stay on record for
/// audit and are excluded from the views and from reminder eligibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obligation {
    pub id: ObligationId,
    pub vehicle_id: VehicleId,
    pub user_id: UserId,
    pub kind: ObligationKind,
    pub due_date: NaiveDate,
    pub auto_renew_enabled: bool,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for recording a new deadline.
///
/// (vehicle, kind, due_date) is the business key; storage rejects duplicates
/// and the importer treats that rejection as already-migrated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObligation {
    pub vehicle_id: VehicleId,
    pub user_id: UserId,
    pub kind: ObligationKind,
    pub due_date: NaiveDate,
    pub auto_renew_enabled: bool,
    pub notes: Option<String>,
}

impl NewObligation {
    /// A plain, non-auto-renewing deadline.
    pub const fn new(
        vehicle_id: VehicleId,
        user_id: UserId,
        kind: ObligationKind,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            vehicle_id,
            user_id,
            kind,
            due_date,
            auto_renew_enabled: false,
            notes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ObligationKind::CitySticker, "city_sticker")]
    #[case(ObligationKind::Emissions, "emissions")]
    #[case(ObligationKind::LicensePlate, "license_plate")]
    fn kind_round_trips_through_storage_form(#[case] kind: ObligationKind, #[case] s: &str) {
        assert_eq!(kind.as_str(), s);
        assert_eq!(s.parse::<ObligationKind>(), Ok(kind));
    }

    #[rstest]
    fn all_lists_each_kind_exactly_once() {
        for kind in [
            ObligationKind::CitySticker,
            ObligationKind::Emissions,
            ObligationKind::LicensePlate,
        ] {
            assert_eq!(
                ObligationKind::ALL.iter().filter(|k| **k == kind).count(),
                1
            );
        }
    }

    #[rstest]
    fn unknown_kind_is_rejected() {
        let err = "parking_permit"
            .parse::<ObligationKind>()
            .expect_err("unknown kind");
        assert!(err.to_string().contains("parking_permit"));
    }

    #[rstest]
    fn kind_serialises_snake_case() {
        let json = serde_json::to_string(&ObligationKind::CitySticker).expect("serialises");
        assert_eq!(json, r#""city_sticker""#);
    }
}
