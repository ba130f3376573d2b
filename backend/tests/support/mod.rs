//! In-memory port implementations for end-to-end service tests.
//!
//! A single [`InMemoryLedger`] backs every repository port plus the legacy
//! source, enforcing the same uniqueness rules as the SQL schema (unique
//! email, unique (user, plate), unique (vehicle, kind, due date), and the
//! reminder dispatch guard) so service behaviour under conflicts can be
//! exercised without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use autopilot_backend::domain::ports::{
    LegacySignup, LegacySignupSource, LegacySourceError, NotificationGateway,
    NotificationGatewayError, ObligationRepository, ObligationRepositoryError, ReminderNotice,
    ReminderRepository, ReminderRepositoryError, UserRepository, UserRepositoryError,
    VehicleRepository, VehicleRepositoryError,
};
use autopilot_backend::domain::views::DueObligation;
use autopilot_backend::domain::{
    EmailAddress, LicensePlate, NewObligation, NewReminder, NewUser, NewVehicle, Obligation,
    ObligationId, Reminder, ReminderId, User, UserId, UserUpdate, Vehicle, VehicleId,
};

/// Settable clock shared between tests and services.
pub struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub fn at(date: NaiveDate) -> Self {
        Self {
            now: Mutex::new(noon(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.now.lock().expect("clock poisoned") = noon(date);
    }
}

fn noon(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).expect("valid time"))
}

impl Clock for TestClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock poisoned")
    }
}

#[derive(Default)]
struct LedgerState {
    legacy: Option<Vec<LegacySignup>>,
    users: Vec<User>,
    vehicles: Vec<Vehicle>,
    obligations: Vec<Obligation>,
    reminders: Vec<Reminder>,
}

/// In-memory stand-in for the PostgreSQL adapters.
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the legacy table; `None` models a fresh install without it.
    pub fn with_legacy_rows(rows: Option<Vec<LegacySignup>>) -> Self {
        let ledger = Self::new();
        ledger.state.lock().expect("ledger poisoned").legacy = rows;
        ledger
    }

    /// Swap the legacy table contents between import runs.
    pub fn replace_legacy_rows(&self, rows: Vec<LegacySignup>) {
        self.state.lock().expect("ledger poisoned").legacy = Some(rows);
    }

    pub fn users(&self) -> Vec<User> {
        self.state.lock().expect("ledger poisoned").users.clone()
    }

    pub fn vehicles(&self) -> Vec<Vehicle> {
        self.state.lock().expect("ledger poisoned").vehicles.clone()
    }

    pub fn obligations(&self) -> Vec<Obligation> {
        self.state
            .lock()
            .expect("ledger poisoned")
            .obligations
            .clone()
    }

    pub fn reminders(&self) -> Vec<Reminder> {
        self.state
            .lock()
            .expect("ledger poisoned")
            .reminders
            .clone()
    }
}

fn to_due(state: &LedgerState, obligation: &Obligation) -> DueObligation {
    let vehicle = state
        .vehicles
        .iter()
        .find(|v| v.id == obligation.vehicle_id)
        .expect("obligation references a stored vehicle");
    let user = state
        .users
        .iter()
        .find(|u| u.id == obligation.user_id)
        .expect("obligation references a stored user");
    DueObligation {
        id: obligation.id,
        vehicle_id: obligation.vehicle_id,
        user_id: obligation.user_id,
        kind: obligation.kind,
        due_date: obligation.due_date,
        license_plate: vehicle.license_plate.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        preferences: user.preferences.clone(),
    }
}

fn open_sorted<'a>(
    state: &'a LedgerState,
    keep: impl Fn(&Obligation) -> bool + 'a,
) -> Vec<DueObligation> {
    let mut rows: Vec<&Obligation> = state
        .obligations
        .iter()
        .filter(|o| !o.completed && keep(o))
        .collect();
    rows.sort_by_key(|o| o.due_date);
    rows.into_iter().map(|o| to_due(state, o)).collect()
}

#[async_trait]
impl UserRepository for InMemoryLedger {
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut state = self.state.lock().expect("ledger poisoned");
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(UserRepositoryError::duplicate_email(user.email.as_ref()));
        }
        let now = Utc::now();
        let stored = User {
            id: UserId::random(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email_verified: false,
            phone_verified: false,
            preferences: user.preferences.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        state.users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let state = self.state.lock().expect("ledger poisoned");
        Ok(state.users.iter().find(|u| u.email == *email).cloned())
    }

    async fn update(&self, id: UserId, update: &UserUpdate) -> Result<(), UserRepositoryError> {
        let mut state = self.state.lock().expect("ledger poisoned");
        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Err(UserRepositoryError::query("no such user"));
        };
        user.apply(update);
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl VehicleRepository for InMemoryLedger {
    async fn create(&self, vehicle: &NewVehicle) -> Result<Vehicle, VehicleRepositoryError> {
        let mut state = self.state.lock().expect("ledger poisoned");
        if !state.users.iter().any(|u| u.id == vehicle.user_id) {
            return Err(VehicleRepositoryError::unknown_user("no such user"));
        }
        if state
            .vehicles
            .iter()
            .any(|v| v.user_id == vehicle.user_id && v.license_plate == vehicle.license_plate)
        {
            return Err(VehicleRepositoryError::duplicate_plate(
                vehicle.license_plate.as_ref(),
            ));
        }
        let now = Utc::now();
        let stored = Vehicle {
            id: VehicleId::random(),
            user_id: vehicle.user_id,
            license_plate: vehicle.license_plate.clone(),
            vin: vehicle.vin.clone(),
            year: vehicle.year,
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            zip_code: vehicle.zip_code.clone(),
            mailing: vehicle.mailing.clone(),
            subscription_id: vehicle.subscription_id.clone(),
            subscription_status: vehicle.subscription_status.clone(),
            created_at: now,
            updated_at: now,
        };
        state.vehicles.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_plate(
        &self,
        user_id: UserId,
        plate: &LicensePlate,
    ) -> Result<Option<Vehicle>, VehicleRepositoryError> {
        let state = self.state.lock().expect("ledger poisoned");
        Ok(state
            .vehicles
            .iter()
            .find(|v| v.user_id == user_id && v.license_plate == *plate)
            .cloned())
    }
}

#[async_trait]
impl ObligationRepository for InMemoryLedger {
    async fn create(
        &self,
        obligation: &NewObligation,
    ) -> Result<Obligation, ObligationRepositoryError> {
        let mut state = self.state.lock().expect("ledger poisoned");
        if !state.vehicles.iter().any(|v| v.id == obligation.vehicle_id) {
            return Err(ObligationRepositoryError::unknown_reference(
                "no such vehicle",
            ));
        }
        if state.obligations.iter().any(|o| {
            o.vehicle_id == obligation.vehicle_id
                && o.kind == obligation.kind
                && o.due_date == obligation.due_date
        }) {
            return Err(ObligationRepositoryError::duplicate_obligation(format!(
                "{} already recorded for {}",
                obligation.kind, obligation.due_date
            )));
        }
        let now = Utc::now();
        let stored = Obligation {
            id: ObligationId::random(),
            vehicle_id: obligation.vehicle_id,
            user_id: obligation.user_id,
            kind: obligation.kind,
            due_date: obligation.due_date,
            auto_renew_enabled: obligation.auto_renew_enabled,
            completed: false,
            completed_at: None,
            notes: obligation.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        state.obligations.push(stored.clone());
        Ok(stored)
    }

    async fn mark_completed(
        &self,
        id: ObligationId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), ObligationRepositoryError> {
        let mut state = self.state.lock().expect("ledger poisoned");
        let Some(obligation) = state.obligations.iter_mut().find(|o| o.id == id) else {
            return Err(ObligationRepositoryError::not_found(id.to_string()));
        };
        if !obligation.completed {
            obligation.completed = true;
            obligation.completed_at = Some(completed_at);
            obligation.updated_at = completed_at;
        }
        Ok(())
    }

    async fn list_upcoming(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<DueObligation>, ObligationRepositoryError> {
        let state = self.state.lock().expect("ledger poisoned");
        Ok(open_sorted(&state, |o| o.due_date >= today))
    }

    async fn list_overdue(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<DueObligation>, ObligationRepositoryError> {
        let state = self.state.lock().expect("ledger poisoned");
        Ok(open_sorted(&state, |o| o.due_date < today))
    }

    async fn due_needing_reminder(
        &self,
        lead_days: u16,
        today: NaiveDate,
    ) -> Result<Vec<DueObligation>, ObligationRepositoryError> {
        let state = self.state.lock().expect("ledger poisoned");
        let target = today + chrono::Duration::days(i64::from(lead_days));
        Ok(open_sorted(&state, |o| {
            o.due_date == target
                && !state.reminders.iter().any(|r| {
                    r.obligation_id == o.id
                        && r.days_until_due == lead_days
                        && r.sent_at.date_naive() == today
                })
        }))
    }
}

#[async_trait]
impl ReminderRepository for InMemoryLedger {
    async fn append(&self, reminder: &NewReminder) -> Result<Reminder, ReminderRepositoryError> {
        let mut state = self.state.lock().expect("ledger poisoned");
        let day = reminder.sent_at.date_naive();
        if state.reminders.iter().any(|r| {
            r.obligation_id == reminder.obligation_id
                && r.days_until_due == reminder.days_until_due
                && r.sent_at.date_naive() == day
        }) {
            return Err(ReminderRepositoryError::duplicate_dispatch(
                "dispatch guard index",
            ));
        }
        let stored = Reminder {
            id: ReminderId::random(),
            obligation_id: reminder.obligation_id,
            user_id: reminder.user_id,
            sent_at: reminder.sent_at,
            method: reminder.method,
            days_until_due: reminder.days_until_due,
            status: reminder.status,
            error_message: reminder.error_message.clone(),
        };
        state.reminders.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl LegacySignupSource for InMemoryLedger {
    async fn fetch_all(&self) -> Result<Option<Vec<LegacySignup>>, LegacySourceError> {
        let state = self.state.lock().expect("ledger poisoned");
        Ok(state.legacy.clone())
    }
}

/// Gateway that records notices and can be told to fail deliveries.
#[derive(Default)]
pub struct RecordingGateway {
    delivered: Mutex<Vec<ReminderNotice>>,
    failing: Mutex<bool>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().expect("gateway poisoned") = failing;
    }

    pub fn delivered(&self) -> Vec<ReminderNotice> {
        self.delivered.lock().expect("gateway poisoned").clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(&self, notice: &ReminderNotice) -> Result<(), NotificationGatewayError> {
        if *self.failing.lock().expect("gateway poisoned") {
            return Err(NotificationGatewayError::delivery("provider rejected"));
        }
        self.delivered
            .lock()
            .expect("gateway poisoned")
            .push(notice.clone());
        Ok(())
    }
}
