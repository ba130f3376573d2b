//! End-to-end behaviour of the import, dispatch, and view services wired
//! over in-memory adapters.
//!
//! These tests exercise the properties the services promise together:
//! re-running the legacy import changes nothing, a reminder lands at most
//! once per (obligation, lead time, calendar day), failed deliveries block
//! same-day retries but not the next day, and completion drops an
//! obligation out of both the views and dispatch eligibility.

mod support;

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::rstest;

use autopilot_backend::domain::ports::{LegacySignup, ObligationViews, UserRepository};
use autopilot_backend::domain::{
    LegacyImportService, NotificationPreferences, ObligationKind, ObligationViewService,
    ReminderDispatchService, ReminderMethod, ReminderStatus, UserUpdate,
};

use support::{InMemoryLedger, RecordingGateway, TestClock};

type Importer =
    LegacyImportService<InMemoryLedger, InMemoryLedger, InMemoryLedger, InMemoryLedger>;
type Dispatcher = ReminderDispatchService<InMemoryLedger, InMemoryLedger, RecordingGateway>;

/// Everything one scenario needs: the shared store, a scriptable gateway,
/// and a settable clock.
struct Harness {
    store: Arc<InMemoryLedger>,
    gateway: Arc<RecordingGateway>,
    clock: Arc<TestClock>,
}

impl Harness {
    fn new(legacy: Option<Vec<LegacySignup>>, today: NaiveDate) -> Self {
        Self {
            store: Arc::new(InMemoryLedger::with_legacy_rows(legacy)),
            gateway: Arc::new(RecordingGateway::new()),
            clock: Arc::new(TestClock::at(today)),
        }
    }

    fn importer(&self) -> Importer {
        LegacyImportService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
        )
    }

    fn dispatcher(&self) -> Dispatcher {
        ReminderDispatchService::new(
            self.store.clone(),
            self.store.clone(),
            self.gateway.clone(),
            self.clock.clone(),
        )
    }

    fn views(&self) -> ObligationViewService<InMemoryLedger> {
        ObligationViewService::new(self.store.clone(), self.clock.clone())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn signup(email: &str, plate: &str) -> LegacySignup {
    LegacySignup {
        email: Some(email.to_owned()),
        license_plate: Some(plate.to_owned()),
        ..LegacySignup::default()
    }
}

#[tokio::test]
async fn import_builds_the_normalised_graph() {
    let mut plain = signup("ada@example.com", "ab1234");
    plain.first_name = Some("A.".to_owned());
    plain.city_sticker_expiry = Some(date(2025, 6, 30));
    let mut canonical = signup("ada@example.com", "CD5678");
    canonical.legacy_user_id = Some(uuid::Uuid::new_v4().to_string());
    canonical.first_name = Some("Ada".to_owned());
    canonical.phone = Some("+13125550100".to_owned());
    canonical.emissions_due_date = Some(date(2025, 9, 1));

    let harness = Harness::new(Some(vec![plain, canonical]), date(2025, 5, 2));
    let report = harness.importer().run().await.expect("import runs");

    assert_eq!(report.rows_seen, 2);
    assert_eq!(report.users_created, 1);
    assert_eq!(report.vehicles_created, 2);
    assert_eq!(report.obligations_created.total(), 2);
    assert_eq!(report.rows_failed, 0);

    let users = harness.store.users();
    let user = users.first().expect("one user stored");
    assert_eq!(user.first_name.as_deref(), Some("Ada"), "canonical row wins");
    assert_eq!(user.phone.as_deref(), Some("+13125550100"));

    let mut plates: Vec<String> = harness
        .store
        .vehicles()
        .iter()
        .map(|v| v.license_plate.to_string())
        .collect();
    plates.sort();
    assert_eq!(plates, vec!["AB1234", "CD5678"]);

    let kinds: Vec<ObligationKind> = harness
        .store
        .obligations()
        .iter()
        .map(|o| o.kind)
        .collect();
    assert!(kinds.contains(&ObligationKind::CitySticker));
    assert!(kinds.contains(&ObligationKind::Emissions));
}

#[tokio::test]
async fn reimport_changes_nothing() {
    let mut row = signup("ada@example.com", "AB1234");
    row.city_sticker_expiry = Some(date(2025, 6, 30));
    row.license_plate_expiry = Some(date(2025, 8, 15));

    let harness = Harness::new(Some(vec![row]), date(2025, 5, 2));
    let first = harness.importer().run().await.expect("first import");
    assert_eq!(first.users_created, 1);
    assert_eq!(first.obligations_created.total(), 2);

    let second = harness.importer().run().await.expect("second import");
    assert_eq!(second.users_created, 0);
    assert_eq!(second.users_updated, 0);
    assert_eq!(second.vehicles_created, 0);
    assert_eq!(second.vehicles_existing, 1);
    assert_eq!(second.obligations_created.total(), 0);
    assert_eq!(second.obligations_skipped, 2);
    assert_eq!(second.rows_failed, 0);

    assert_eq!(harness.store.users().len(), 1);
    assert_eq!(harness.store.vehicles().len(), 1);
    assert_eq!(harness.store.obligations().len(), 2);
}

#[tokio::test]
async fn reimported_phone_overwrites_the_stored_value() {
    let mut original = signup("ada@example.com", "AB1234");
    original.phone = Some("+13125550100".to_owned());

    let harness = Harness::new(Some(vec![original.clone()]), date(2025, 5, 2));
    harness.importer().run().await.expect("first import");

    // A corrected phone lands in the legacy table before the next run.
    let mut corrected = original;
    corrected.phone = Some("+19998887777".to_owned());
    harness.store.replace_legacy_rows(vec![corrected]);
    harness.importer().run().await.expect("second import");

    let users = harness.store.users();
    let user = users.first().expect("one user stored");
    assert_eq!(user.phone.as_deref(), Some("+19998887777"));
}

#[tokio::test]
async fn fresh_install_without_a_legacy_table_is_a_clean_no_op() {
    let harness = Harness::new(None, date(2025, 5, 2));
    let report = harness.importer().run().await.expect("import runs");
    assert!(report.source_missing);
    assert_eq!(report.rows_seen, 0);
    assert!(harness.store.users().is_empty());
    assert!(harness.store.obligations().is_empty());
}

#[tokio::test]
async fn dispatch_sends_once_per_lead_time_and_day() {
    let mut row = signup("ada@example.com", "AB1234");
    row.city_sticker_expiry = Some(date(2025, 6, 1));

    let harness = Harness::new(Some(vec![row]), date(2025, 5, 2));
    harness.importer().run().await.expect("import runs");

    let report = harness.dispatcher().run(30).await.expect("dispatch runs");
    assert_eq!(report.examined, 1);
    assert_eq!(report.sent, 1);

    let delivered = harness.gateway.delivered();
    let notice = delivered.first().expect("one delivery");
    assert_eq!(notice.method, ReminderMethod::Email);
    assert_eq!(notice.days_until_due, 30);
    assert_eq!(notice.due_date, date(2025, 6, 1));
    assert_eq!(notice.kind, ObligationKind::CitySticker);

    let rerun = harness.dispatcher().run(30).await.expect("rerun");
    assert_eq!(rerun.examined, 0);
    assert_eq!(rerun.sent, 0);
    assert_eq!(harness.store.reminders().len(), 1);
}

#[tokio::test]
async fn failed_delivery_blocks_same_day_retry_but_not_the_next_day() {
    let mut row = signup("ada@example.com", "AB1234");
    row.city_sticker_expiry = Some(date(2025, 6, 1));

    let harness = Harness::new(Some(vec![row]), date(2025, 5, 2));
    harness.importer().run().await.expect("import runs");

    harness.gateway.set_failing(true);
    let report = harness.dispatcher().run(30).await.expect("dispatch runs");
    assert_eq!(report.failed, 1);
    assert_eq!(report.sent, 0);
    let reminders = harness.store.reminders();
    assert_eq!(
        reminders.first().map(|r| r.status),
        Some(ReminderStatus::Failed)
    );

    // The failed attempt occupies this (lead time, day) slot.
    let same_day = harness.dispatcher().run(30).await.expect("rerun");
    assert_eq!(same_day.examined, 0);

    // Next calendar day the obligation is 29 days out and eligible again.
    harness.gateway.set_failing(false);
    harness.clock.set(date(2025, 5, 3));
    let next_day = harness.dispatcher().run(29).await.expect("next day");
    assert_eq!(next_day.sent, 1);
    assert_eq!(harness.store.reminders().len(), 2);
}

#[tokio::test]
async fn completion_drops_the_obligation_from_views_and_dispatch() {
    let mut row = signup("ada@example.com", "AB1234");
    row.city_sticker_expiry = Some(date(2025, 6, 1));

    let harness = Harness::new(Some(vec![row]), date(2025, 5, 2));
    harness.importer().run().await.expect("import runs");
    let views = harness.views();

    let upcoming = views.upcoming().await.expect("view loads");
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming.first().map(|u| u.days_until_due), Some(30));
    assert!(views.overdue().await.expect("view loads").is_empty());

    let id = harness
        .store
        .obligations()
        .first()
        .expect("one obligation")
        .id;
    views.complete(id).await.expect("completes");

    assert!(views.upcoming().await.expect("view loads").is_empty());
    let report = harness.dispatcher().run(30).await.expect("dispatch runs");
    assert_eq!(report.examined, 0);

    let obligations = harness.store.obligations();
    let completed = obligations.first().expect("still on record");
    assert!(completed.completed);
    assert_eq!(
        completed.completed_at.map(|at| at.date_naive()),
        Some(date(2025, 5, 2))
    );
}

#[rstest]
#[case::due_today(date(2025, 5, 2), true, 0)]
#[case::due_next_month(date(2025, 6, 1), true, 30)]
#[case::twelve_days_late(date(2025, 4, 20), false, 12)]
#[tokio::test]
async fn views_partition_on_today(
    #[case] due: NaiveDate,
    #[case] upcoming: bool,
    #[case] day_count: i64,
) {
    let mut row = signup("ada@example.com", "AB1234");
    row.city_sticker_expiry = Some(due);

    let harness = Harness::new(Some(vec![row]), date(2025, 5, 2));
    harness.importer().run().await.expect("import runs");
    let views = harness.views();

    if upcoming {
        let rows = views.upcoming().await.expect("view loads");
        assert_eq!(rows.first().map(|u| u.days_until_due), Some(day_count));
        assert!(views.overdue().await.expect("view loads").is_empty());
    } else {
        let rows = views.overdue().await.expect("view loads");
        assert_eq!(rows.first().map(|o| o.days_overdue), Some(day_count));
        assert!(views.upcoming().await.expect("view loads").is_empty());
    }
}

#[tokio::test]
async fn users_with_every_channel_disabled_are_skipped_without_log_entries() {
    let mut row = signup("ada@example.com", "AB1234");
    row.city_sticker_expiry = Some(date(2025, 6, 1));

    let harness = Harness::new(Some(vec![row]), date(2025, 5, 2));
    harness.importer().run().await.expect("import runs");

    let user = harness.store.users().first().expect("one user").clone();
    let muted = NotificationPreferences {
        email: false,
        sms: false,
        voice: false,
        reminder_days: vec![30],
    };
    harness
        .store
        .update(
            user.id,
            &UserUpdate {
                preferences: Some(muted),
                ..UserUpdate::default()
            },
        )
        .await
        .expect("preferences update");

    let report = harness.dispatcher().run(30).await.expect("dispatch runs");
    assert_eq!(report.skipped_no_channel, 1);
    assert!(harness.store.reminders().is_empty());
    assert!(harness.gateway.delivered().is_empty());

    // No log entry was written, so the obligation stays eligible.
    let rerun = harness.dispatcher().run(30).await.expect("rerun");
    assert_eq!(rerun.examined, 1);
    assert_eq!(rerun.skipped_no_channel, 1);
}
