//! Integration tests: periodic scan and on-demand rescheduling against a
//! real repository and a recording notifier.

use chrono::{NaiveDate, NaiveTime};

use plantcare::Error;
use plantcare::adapters::sqlite::SqliteStore;
use plantcare::app::ports::{NotifyError, StoreError, StorePort, Trigger};
use plantcare::config::AppConfig;
use plantcare::model::{PlantDraft, PlantId};
use plantcare::repository::PlantRepository;
use plantcare::scheduler::{ScanOutcome, WateringScheduler};

use super::mock_ports::{FlakyStore, MockNotifier, NotifyCall};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

const TODAY: &str = "2025-08-25";

/// Three plants: only "Fern" is due exactly today.
fn garden() -> (PlantRepository<SqliteStore>, PlantId) {
    let mut repo = PlantRepository::open(SqliteStore::in_memory().unwrap()).unwrap();
    repo.add(&PlantDraft::new("Cactus", 14, date("2025-08-20"))).unwrap();
    let fern = repo.add(&PlantDraft::new("Fern", 5, date("2025-08-20"))).unwrap();
    // Overdue since 2025-08-23: not "exactly today".
    repo.add(&PlantDraft::new("Basil", 3, date("2025-08-20"))).unwrap();
    (repo, fern)
}

fn scheduler() -> WateringScheduler {
    WateringScheduler::new(&AppConfig::default())
}

#[test]
fn scan_reminds_exactly_the_plant_due_today() {
    let (mut repo, fern) = garden();
    let mut notifier = MockNotifier::new();

    let report = scheduler().run_periodic_scan(&mut repo, date(TODAY), &mut notifier);

    assert_eq!(report.examined, 3);
    assert_eq!(report.reminded, vec![fern]);
    assert_eq!(report.outcome(), ScanOutcome::NewData);

    let sent = notifier.scheduled();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].plant_id, fern);
    assert_eq!(sent[0].trigger, Trigger::Immediate);
    assert!(sent[0].body.contains("Fern"));

    assert_eq!(repo.get_by_id(fern).unwrap().last_notified, Some(date(TODAY)));
}

#[test]
fn empty_scan_succeeds_without_reminders() {
    let mut repo = PlantRepository::open(SqliteStore::in_memory().unwrap()).unwrap();
    let mut notifier = MockNotifier::new();

    let report = scheduler().run_periodic_scan(&mut repo, date(TODAY), &mut notifier);

    assert!(report.is_success());
    assert_eq!(report.outcome(), ScanOutcome::NoData);
    assert!(notifier.calls.is_empty());
}

#[test]
fn rerunning_the_scan_on_the_same_day_is_a_no_op() {
    let (mut repo, fern) = garden();
    let mut notifier = MockNotifier::new();
    let sched = scheduler();

    sched.run_periodic_scan(&mut repo, date(TODAY), &mut notifier);
    let again = sched.run_periodic_scan(&mut repo, date(TODAY), &mut notifier);

    assert!(again.reminded.is_empty());
    assert_eq!(again.already_notified, vec![fern]);
    assert_eq!(again.outcome(), ScanOutcome::NoData);
    assert_eq!(notifier.scheduled_for(fern), 1);
}

#[test]
fn sink_failure_for_one_plant_does_not_stop_the_others() {
    let mut repo = PlantRepository::open(SqliteStore::in_memory().unwrap()).unwrap();
    let a = repo.add(&PlantDraft::new("Ivy", 5, date("2025-08-20"))).unwrap();
    let b = repo.add(&PlantDraft::new("Mint", 5, date("2025-08-20"))).unwrap();
    let c = repo.add(&PlantDraft::new("Sage", 5, date("2025-08-20"))).unwrap();

    let mut notifier = MockNotifier::new();
    notifier.reject.push(b);

    let report = scheduler().run_periodic_scan(&mut repo, date(TODAY), &mut notifier);

    assert_eq!(report.reminded, vec![a, c]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].plant_id, Some(b));
    assert!(matches!(
        report.failures[0].error,
        Error::Notification(NotifyError::Rejected(_))
    ));
    assert_eq!(report.outcome(), ScanOutcome::Failed);

    // The rejected plant is not marked, so a later scan retries it.
    assert_eq!(repo.get_by_id(b).unwrap().last_notified, None);
    notifier.reject.clear();
    let retry = scheduler().run_periodic_scan(&mut repo, date(TODAY), &mut notifier);
    assert_eq!(retry.reminded, vec![b]);
}

#[test]
fn corrupt_row_is_reported_and_skipped() {
    let mut store = SqliteStore::in_memory().unwrap();
    store
        .execute(
            "CREATE TABLE plants (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                name TEXT NOT NULL,
                location TEXT,
                wateringInterval INTEGER,
                lastWatered TEXT,
                imageUri TEXT,
                lastNotified TEXT
            );
            INSERT INTO plants (name, wateringInterval, lastWatered) VALUES ('Broken', -1, '2025-08-20');
            INSERT INTO plants (name, wateringInterval, lastWatered) VALUES ('Fern', 5, '2025-08-20');",
        )
        .unwrap();
    let mut repo = PlantRepository::open(store).unwrap();
    let mut notifier = MockNotifier::new();

    let report = scheduler().run_periodic_scan(&mut repo, date(TODAY), &mut notifier);

    assert_eq!(report.examined, 2);
    assert_eq!(report.reminded, vec![PlantId(2)]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        Error::Storage(StoreError::Corrupted(_))
    ));
}

#[test]
fn denied_permission_aborts_the_scan() {
    let (mut repo, fern) = garden();
    let mut notifier = MockNotifier::denied();

    let report = scheduler().run_periodic_scan(&mut repo, date(TODAY), &mut notifier);

    assert_eq!(
        report.aborted,
        Some(Error::Notification(NotifyError::PermissionDenied))
    );
    assert_eq!(report.outcome(), ScanOutcome::Failed);
    assert!(notifier.scheduled().is_empty());
    assert_eq!(repo.get_by_id(fern).unwrap().last_notified, None);
}

#[test]
fn unreadable_store_aborts_the_scan() {
    let (store, faults) = FlakyStore::new();
    let mut repo = PlantRepository::open(store).unwrap();
    repo.add(&PlantDraft::new("Fern", 5, date("2025-08-20"))).unwrap();
    faults.fail_reads(true);

    let mut notifier = MockNotifier::new();
    let report = scheduler().run_periodic_scan(&mut repo, date(TODAY), &mut notifier);

    assert_eq!(report.aborted, Some(Error::Storage(StoreError::Unavailable)));
    assert_eq!(report.summary().failed, 1);
    assert!(notifier.calls.is_empty());
}

#[test]
fn ledger_write_failure_is_recorded_after_the_reminder() {
    let (store, faults) = FlakyStore::new();
    let mut repo = PlantRepository::open(store).unwrap();
    let fern = repo.add(&PlantDraft::new("Fern", 5, date("2025-08-20"))).unwrap();
    faults.fail_writes(true);

    let mut notifier = MockNotifier::new();
    let report = scheduler().run_periodic_scan(&mut repo, date(TODAY), &mut notifier);

    assert_eq!(report.reminded, vec![fern]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].plant_id, Some(fern));
}

#[test]
fn reschedule_cancels_before_scheduling_at_reminder_time() {
    let (repo, fern) = garden();
    let plant = repo.get_by_id(fern).unwrap();
    let mut notifier = MockNotifier::new();
    let now = date("2025-08-21").and_hms_opt(18, 0, 0).unwrap();

    scheduler().reschedule(&plant, now, &mut notifier).unwrap();

    assert_eq!(notifier.calls.len(), 3);
    assert_eq!(notifier.calls[0], NotifyCall::Permission);
    assert_eq!(notifier.calls[1], NotifyCall::Cancel(fern));
    let sent = notifier.scheduled();
    assert_eq!(
        sent[0].trigger,
        Trigger::At(date(TODAY).and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()))
    );
}

#[test]
fn reschedule_of_overdue_plant_fires_immediately() {
    let (repo, _) = garden();
    let basil = repo.list().into_iter().find(|p| p.name == "Basil").unwrap();
    let mut notifier = MockNotifier::new();
    let now = date(TODAY).and_hms_opt(8, 0, 0).unwrap();

    scheduler().reschedule(&basil, now, &mut notifier).unwrap();

    assert_eq!(notifier.scheduled()[0].trigger, Trigger::Immediate);
}

#[test]
fn reschedule_with_denied_permission_schedules_nothing() {
    let (repo, fern) = garden();
    let plant = repo.get_by_id(fern).unwrap();
    let mut notifier = MockNotifier::denied();
    let now = date("2025-08-21").and_hms_opt(8, 0, 0).unwrap();

    let err = scheduler().reschedule(&plant, now, &mut notifier).unwrap_err();

    assert_eq!(err, NotifyError::PermissionDenied);
    assert!(notifier.cancelled().is_empty());
    assert!(notifier.scheduled().is_empty());
}

#[test]
fn scan_replaces_a_pending_timed_reminder_for_the_due_plant() {
    let (mut repo, fern) = garden();
    let plant = repo.get_by_id(fern).unwrap();
    let mut notifier = MockNotifier::new();
    let sched = scheduler();

    // Armed the evening before for 09:00 on the due date.
    let evening = date("2025-08-24").and_hms_opt(20, 0, 0).unwrap();
    sched.reschedule(&plant, evening, &mut notifier).unwrap();
    let armed = notifier.calls.len();

    let report = sched.run_periodic_scan(&mut repo, date(TODAY), &mut notifier);
    assert_eq!(report.reminded, vec![fern]);

    let scan_calls = &notifier.calls[armed..];
    let cancel = scan_calls
        .iter()
        .position(|c| *c == NotifyCall::Cancel(fern))
        .expect("scan cancels the pending reminder");
    let emit = scan_calls
        .iter()
        .position(|c| matches!(c, NotifyCall::Schedule(r) if r.trigger == Trigger::Immediate))
        .unwrap();
    assert!(cancel < emit);
}
