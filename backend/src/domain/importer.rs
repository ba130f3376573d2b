//! Legacy signup migration: dedup, merge, and conflict-as-skip import.
//!
//! The legacy system stored one wide row per signup, repeating user contact
//! details for every vehicle. This service folds those rows into the
//! normalised ledger: one user per email, one vehicle per (user, plate), one
//! obligation per (vehicle, kind, due date). Re-running the import against a
//! partially or fully migrated database is safe; uniqueness conflicts are
//! treated as already-migrated and counted as skips.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{LedgerError, LedgerResult};
use super::obligation::{NewObligation, ObligationKind};
use super::ports::{
    LegacySignup, LegacySignupSource, ObligationRepository, ObligationRepositoryError,
    UserRepository, UserRepositoryError, VehicleRepository, VehicleRepositoryError,
};
use super::user::{EmailAddress, NewUser, User};
use super::vehicle::{LicensePlate, MailingAddress, NewVehicle, Vehicle};

/// Obligations created during an import, broken down by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObligationCounts {
    pub city_sticker: usize,
    pub emissions: usize,
    pub license_plate: usize,
}

impl ObligationCounts {
    fn record(&mut self, kind: ObligationKind) {
        match kind {
            ObligationKind::CitySticker => self.city_sticker += 1,
            ObligationKind::Emissions => self.emissions += 1,
            ObligationKind::LicensePlate => self.license_plate += 1,
        }
    }

    /// Total obligations created across all kinds.
    pub fn total(&self) -> usize {
        self.city_sticker + self.emissions + self.license_plate
    }
}

/// Tally of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// The legacy table does not exist; nothing was migrated.
    pub source_missing: bool,
    pub rows_seen: usize,
    pub users_created: usize,
    /// Existing users that received merged contact details.
    pub users_updated: usize,
    pub vehicles_created: usize,
    /// Rows whose (user, plate) vehicle was already on record.
    pub vehicles_existing: usize,
    pub obligations_created: ObligationCounts,
    /// Obligations rejected by the (vehicle, kind, due date) constraint.
    pub obligations_skipped: usize,
    /// Rows abandoned after a validation or storage failure. Other rows are
    /// unaffected.
    pub rows_failed: usize,
}

/// What happened to a single legacy row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Vehicle resolved and every present due date landed or was skipped as
    /// a duplicate.
    Migrated,
    /// The row carried no license plate; contact details may still have
    /// merged into the user.
    NoVehicle,
    /// The row was abandoned part-way.
    Failed { reason: String },
}

/// Legacy rows sharing one validated email, canonical row first.
struct EmailGroup {
    email: EmailAddress,
    rows: Vec<LegacySignup>,
}

/// One-shot migration service over the legacy signup table.
pub struct LegacyImportService<S, U, V, O> {
    source: Arc<S>,
    users: Arc<U>,
    vehicles: Arc<V>,
    obligations: Arc<O>,
}

impl<S, U, V, O> LegacyImportService<S, U, V, O>
where
    S: LegacySignupSource,
    U: UserRepository,
    V: VehicleRepository,
    O: ObligationRepository,
{
    pub fn new(source: Arc<S>, users: Arc<U>, vehicles: Arc<V>, obligations: Arc<O>) -> Self {
        Self {
            source,
            users,
            vehicles,
            obligations,
        }
    }

    /// Run the import end to end and report what changed.
    ///
    /// Only source-level failures abort the run; individual bad rows are
    /// logged, counted, and stepped over.
    pub async fn run(&self) -> LedgerResult<ImportReport> {
        let rows = self
            .source
            .fetch_all()
            .await
            .map_err(|error| LedgerError::storage(error.to_string()))?;
        let Some(rows) = rows else {
            info!("legacy signup table absent, nothing to import");
            return Ok(ImportReport {
                source_missing: true,
                ..ImportReport::default()
            });
        };

        let mut report = ImportReport {
            rows_seen: rows.len(),
            ..ImportReport::default()
        };
        for group in group_by_email(rows, &mut report) {
            self.import_group(group, &mut report).await;
        }

        info!(
            rows_seen = report.rows_seen,
            users_created = report.users_created,
            users_updated = report.users_updated,
            vehicles_created = report.vehicles_created,
            obligations_created = report.obligations_created.total(),
            obligations_skipped = report.obligations_skipped,
            rows_failed = report.rows_failed,
            "legacy import finished"
        );
        Ok(report)
    }

    async fn import_group(&self, group: EmailGroup, report: &mut ImportReport) {
        let user = match self.resolve_user(&group.email, &group.rows, report).await {
            Ok(user) => user,
            Err(reason) => {
                warn!(email = %group.email, reason, "user could not be resolved, abandoning its rows");
                report.rows_failed += group.rows.len();
                return;
            }
        };
        for row in &group.rows {
            if let RowOutcome::Failed { reason } = self.import_row(&user, row, report).await {
                warn!(email = %group.email, reason, "legacy row abandoned");
                report.rows_failed += 1;
            }
        }
    }

    /// Find or create the user for one email group and merge contact details
    /// from every row into it.
    ///
    /// The canonical row (first in the group) merges last-write-wins: its
    /// non-null names and phone overwrite. The rest only fill gaps.
    async fn resolve_user(
        &self,
        email: &EmailAddress,
        rows: &[LegacySignup],
        report: &mut ImportReport,
    ) -> Result<User, String> {
        let canonical = rows
            .first()
            .map(|row| new_user_from_row(email, row))
            .ok_or_else(|| "empty email group".to_owned())?;

        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(|error| error.to_string())?;
        let (mut user, was_created) = match existing {
            Some(user) => (user, false),
            None => match self.users.create(&canonical).await {
                Ok(user) => (user, true),
                Err(UserRepositoryError::DuplicateEmail { .. }) => {
                    // Lost a create race; the stored row wins.
                    let user = self
                        .users
                        .find_by_email(email)
                        .await
                        .map_err(|error| error.to_string())?
                        .ok_or_else(|| {
                            "user missing after duplicate-email conflict".to_owned()
                        })?;
                    (user, false)
                }
                Err(error) => return Err(error.to_string()),
            },
        };

        let mut changed = false;
        if !was_created {
            if let Some(update) = user.merged_update(&canonical) {
                self.users
                    .update(user.id, &update)
                    .await
                    .map_err(|error| error.to_string())?;
                user.apply(&update);
                changed = true;
            }
        }
        for row in rows.iter().skip(1) {
            let incoming = new_user_from_row(email, row);
            if let Some(update) = user.fill_update(&incoming) {
                self.users
                    .update(user.id, &update)
                    .await
                    .map_err(|error| error.to_string())?;
                user.apply(&update);
                changed = true;
            }
        }

        if was_created {
            report.users_created += 1;
        } else if changed {
            report.users_updated += 1;
        }
        Ok(user)
    }

    async fn import_row(
        &self,
        user: &User,
        row: &LegacySignup,
        report: &mut ImportReport,
    ) -> RowOutcome {
        let Some(raw_plate) = row.license_plate.as_deref() else {
            return RowOutcome::NoVehicle;
        };
        let plate = match LicensePlate::new(raw_plate) {
            Ok(plate) => plate,
            Err(error) => {
                return RowOutcome::Failed {
                    reason: error.to_string(),
                };
            }
        };
        let vehicle = match self.resolve_vehicle(user, plate, row, report).await {
            Ok(vehicle) => vehicle,
            Err(reason) => return RowOutcome::Failed { reason },
        };

        for (kind, due_date) in obligation_dates(row) {
            let obligation = NewObligation::new(vehicle.id, user.id, kind, due_date);
            match self.obligations.create(&obligation).await {
                Ok(_) => report.obligations_created.record(kind),
                Err(ObligationRepositoryError::DuplicateObligation { .. }) => {
                    report.obligations_skipped += 1;
                }
                Err(error) => {
                    return RowOutcome::Failed {
                        reason: error.to_string(),
                    };
                }
            }
        }
        RowOutcome::Migrated
    }

    async fn resolve_vehicle(
        &self,
        user: &User,
        plate: LicensePlate,
        row: &LegacySignup,
        report: &mut ImportReport,
    ) -> Result<Vehicle, String> {
        let existing = self
            .vehicles
            .find_by_plate(user.id, &plate)
            .await
            .map_err(|error| error.to_string())?;
        if let Some(vehicle) = existing {
            report.vehicles_existing += 1;
            return Ok(vehicle);
        }
        match self.vehicles.create(&new_vehicle_from_row(user, plate.clone(), row)).await {
            Ok(vehicle) => {
                report.vehicles_created += 1;
                Ok(vehicle)
            }
            Err(VehicleRepositoryError::DuplicatePlate { .. }) => {
                // Lost a create race; the stored vehicle wins.
                report.vehicles_existing += 1;
                self.vehicles
                    .find_by_plate(user.id, &plate)
                    .await
                    .map_err(|error| error.to_string())?
                    .ok_or_else(|| "vehicle missing after duplicate-plate conflict".to_owned())
            }
            Err(error) => Err(error.to_string()),
        }
    }
}

/// Group rows by validated email, preserving first-seen group order and
/// moving each group's canonical row to the front.
///
/// Rows with a missing or implausible email are counted as failed here.
fn group_by_email(rows: Vec<LegacySignup>, report: &mut ImportReport) -> Vec<EmailGroup> {
    let mut groups: Vec<EmailGroup> = Vec::new();
    let mut index: HashMap<EmailAddress, usize> = HashMap::new();
    for row in rows {
        let email = match row.email.as_deref().map(EmailAddress::new) {
            Some(Ok(email)) => email,
            Some(Err(error)) => {
                warn!(reason = %error, "legacy row has an unusable email");
                report.rows_failed += 1;
                continue;
            }
            None => {
                warn!("legacy row has no email");
                report.rows_failed += 1;
                continue;
            }
        };
        match index.get(&email) {
            Some(&at) => groups[at].rows.push(row),
            None => {
                index.insert(email.clone(), groups.len());
                groups.push(EmailGroup {
                    email,
                    rows: vec![row],
                });
            }
        }
    }
    for group in &mut groups {
        promote_canonical(&mut group.rows);
    }
    groups
}

/// Move the canonical row to the front: the first row whose legacy user id
/// parses as a UUID, else the first row in input order (already in place).
fn promote_canonical(rows: &mut Vec<LegacySignup>) {
    let canonical = rows.iter().position(|row| {
        row.legacy_user_id
            .as_deref()
            .is_some_and(|id| Uuid::parse_str(id).is_ok())
    });
    if let Some(at) = canonical
        && at > 0
    {
        let row = rows.remove(at);
        rows.insert(0, row);
    }
}

fn new_user_from_row(email: &EmailAddress, row: &LegacySignup) -> NewUser {
    NewUser {
        email: email.clone(),
        phone: row.phone.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        preferences: None,
    }
}

fn new_vehicle_from_row(user: &User, plate: LicensePlate, row: &LegacySignup) -> NewVehicle {
    NewVehicle {
        user_id: user.id,
        license_plate: plate,
        vin: row.vin.clone(),
        year: row.year,
        make: row.make.clone(),
        model: row.model.clone(),
        zip_code: row.zip_code.clone(),
        mailing: MailingAddress {
            address: row.mailing_address.clone(),
            city: row.mailing_city.clone(),
            state: row.mailing_state.clone(),
            zip: row.mailing_zip.clone(),
        },
        subscription_id: row.subscription_id.clone(),
        subscription_status: row.subscription_status.clone(),
    }
}

/// Due dates present on a row, in the [`ObligationKind::ALL`] scan order.
fn obligation_dates(row: &LegacySignup) -> Vec<(ObligationKind, NaiveDate)> {
    ObligationKind::ALL
        .into_iter()
        .filter_map(|kind| legacy_date_column(row, kind).map(|due| (kind, due)))
        .collect()
}

/// The legacy column holding the due date for one obligation kind.
fn legacy_date_column(row: &LegacySignup, kind: ObligationKind) -> Option<NaiveDate> {
    match kind {
        ObligationKind::CitySticker => row.city_sticker_expiry,
        ObligationKind::LicensePlate => row.license_plate_expiry,
        ObligationKind::Emissions => row.emissions_due_date,
    }
}
