//! PostgreSQL-backed `ObligationRepository` implementation using Diesel.
//!
//! The due-date queries join obligations with the owning vehicle and user so
//! the domain gets contact details in one round trip. Reminder eligibility
//! is expressed as a correlated NOT EXISTS over the reminders table, using
//! half-open UTC day bounds on `sent_at` so the query stays index-friendly
//! and matches the dispatch guard's definition of "today".

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use diesel::dsl::{exists, not};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{ObligationRepository, ObligationRepositoryError};
use crate::domain::views::DueObligation;
use crate::domain::{
    EmailAddress, LicensePlate, NewObligation, NotificationPreferences, Obligation, ObligationId,
    ObligationKind, UserId, VehicleId,
};

use super::diesel_helpers::{
    DieselErrorClass, classify_diesel_error, collect_rows, pool_error_message,
};
use super::models::{NewObligationRow, ObligationRow};
use super::pool::{DbPool, PoolError};
use super::schema::{obligations, reminders, users, vehicles};

/// Joined row shape shared by the three due-date queries.
type DueRow = (
    Uuid,
    Uuid,
    Uuid,
    String,
    NaiveDate,
    String,
    String,
    Option<String>,
    serde_json::Value,
);

/// Diesel-backed implementation of the `ObligationRepository` port.
#[derive(Clone)]
pub struct DieselObligationRepository {
    pool: DbPool,
}

impl DieselObligationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ObligationRepositoryError {
    ObligationRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ObligationRepositoryError {
    match classify_diesel_error(error) {
        DieselErrorClass::Connection { message } => ObligationRepositoryError::connection(message),
        DieselErrorClass::UniqueViolation { message } => {
            ObligationRepositoryError::duplicate_obligation(message)
        }
        DieselErrorClass::ForeignKeyViolation { message } => {
            ObligationRepositoryError::unknown_reference(message)
        }
        DieselErrorClass::UndefinedTable { message } | DieselErrorClass::Query { message } => {
            ObligationRepositoryError::query(message)
        }
    }
}

/// Convert a stored obligation row to the domain entity.
fn row_to_obligation(row: ObligationRow) -> Result<Obligation, String> {
    let kind: ObligationKind = row
        .kind
        .parse()
        .map_err(|error: crate::domain::obligation::ParseObligationKindError| error.to_string())?;
    Ok(Obligation {
        id: ObligationId::from_uuid(row.id),
        vehicle_id: VehicleId::from_uuid(row.vehicle_id),
        user_id: UserId::from_uuid(row.user_id),
        kind,
        due_date: row.due_date,
        auto_renew_enabled: row.auto_renew_enabled,
        completed: row.completed,
        completed_at: row.completed_at,
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Convert a joined due-date row to the domain read model.
fn row_to_due(row: DueRow) -> Result<DueObligation, String> {
    let (id, vehicle_id, user_id, kind, due_date, plate, email, phone, preferences) = row;
    let kind: ObligationKind = kind
        .parse()
        .map_err(|error: crate::domain::obligation::ParseObligationKindError| error.to_string())?;
    let license_plate = LicensePlate::new(plate)
        .map_err(|error| format!("stored plate failed validation: {error}"))?;
    let email = EmailAddress::new(email)
        .map_err(|error| format!("stored email failed validation: {error}"))?;
    let preferences = match serde_json::from_value::<NotificationPreferences>(preferences) {
        Ok(preferences) => preferences,
        Err(error) => {
            warn!(
                user_id = %user_id,
                %error,
                "unreadable notification_preferences, falling back to defaults"
            );
            NotificationPreferences::default()
        }
    };
    Ok(DueObligation {
        id: ObligationId::from_uuid(id),
        vehicle_id: VehicleId::from_uuid(vehicle_id),
        user_id: UserId::from_uuid(user_id),
        kind,
        due_date,
        license_plate,
        email,
        phone,
        preferences,
    })
}

/// The columns every due-date query selects, in [`DueRow`] order.
macro_rules! due_columns {
    () => {
        (
            obligations::id,
            obligations::vehicle_id,
            obligations::user_id,
            obligations::kind,
            obligations::due_date,
            vehicles::license_plate,
            users::email,
            users::phone,
            users::notification_preferences,
        )
    };
}

#[async_trait]
impl ObligationRepository for DieselObligationRepository {
    async fn create(
        &self,
        obligation: &NewObligation,
    ) -> Result<Obligation, ObligationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewObligationRow {
            id: Uuid::new_v4(),
            vehicle_id: *obligation.vehicle_id.as_uuid(),
            user_id: *obligation.user_id.as_uuid(),
            kind: obligation.kind.as_str(),
            due_date: obligation.due_date,
            auto_renew_enabled: obligation.auto_renew_enabled,
            notes: obligation.notes.as_deref(),
        };

        let row: ObligationRow = diesel::insert_into(obligations::table)
            .values(&new_row)
            .returning(ObligationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_obligation(row).map_err(ObligationRepositoryError::query)
    }

    async fn mark_completed(
        &self,
        id: ObligationId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), ObligationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Filtering on `completed = false` makes the transition one-way: a
        // second call matches zero rows and the original timestamp stands.
        let updated = diesel::update(
            obligations::table.filter(
                obligations::id
                    .eq(id.as_uuid())
                    .and(obligations::completed.eq(false)),
            ),
        )
        .set((
            obligations::completed.eq(true),
            obligations::completed_at.eq(Some(completed_at)),
            obligations::updated_at.eq(completed_at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if updated == 0 {
            // Zero rows is either "already completed" (fine) or "no such
            // obligation" (an error); look again to tell them apart.
            let present: Option<Uuid> = obligations::table
                .filter(obligations::id.eq(id.as_uuid()))
                .select(obligations::id)
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            if present.is_none() {
                return Err(ObligationRepositoryError::not_found(id.to_string()));
            }
        }
        Ok(())
    }

    async fn list_upcoming(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<DueObligation>, ObligationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DueRow> = obligations::table
            .inner_join(vehicles::table)
            .inner_join(users::table)
            .filter(
                obligations::completed
                    .eq(false)
                    .and(obligations::due_date.ge(today)),
            )
            .order(obligations::due_date.asc())
            .select(due_columns!())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(
            rows.into_iter().map(row_to_due),
            ObligationRepositoryError::query,
        )
    }

    async fn list_overdue(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<DueObligation>, ObligationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DueRow> = obligations::table
            .inner_join(vehicles::table)
            .inner_join(users::table)
            .filter(
                obligations::completed
                    .eq(false)
                    .and(obligations::due_date.lt(today)),
            )
            .order(obligations::due_date.asc())
            .select(due_columns!())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(
            rows.into_iter().map(row_to_due),
            ObligationRepositoryError::query,
        )
    }

    async fn due_needing_reminder(
        &self,
        lead_days: u16,
        today: NaiveDate,
    ) -> Result<Vec<DueObligation>, ObligationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target_due = today + Duration::days(i64::from(lead_days));
        let day_start = today.and_time(NaiveTime::MIN).and_utc();
        let day_end = (today + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();

        // Any log entry for (obligation, lead time, today) blocks dispatch,
        // whatever its status; failed attempts wait for the next day.
        let logged_today = reminders::table.filter(
            reminders::obligation_id
                .eq(obligations::id)
                .and(reminders::days_until_due.eq(i32::from(lead_days)))
                .and(reminders::sent_at.ge(day_start))
                .and(reminders::sent_at.lt(day_end)),
        );

        let rows: Vec<DueRow> = obligations::table
            .inner_join(vehicles::table)
            .inner_join(users::table)
            .filter(
                obligations::completed
                    .eq(false)
                    .and(obligations::due_date.eq(target_due)),
            )
            .filter(not(exists(logged_today)))
            .order(obligations::id.asc())
            .select(due_columns!())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(
            rows.into_iter().map(row_to_due),
            ObligationRepositoryError::query,
        )
    }
}
