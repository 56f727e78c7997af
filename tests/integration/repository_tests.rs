//! Integration tests: PlantRepository over a real SQLite store.

use chrono::NaiveDate;

use plantcare::Error;
use plantcare::adapters::sqlite::SqliteStore;
use plantcare::app::ports::{SqlValue, StoreError, StorePort};
use plantcare::model::{PlantDraft, PlantId};
use plantcare::repository::PlantRepository;
use plantcare::scheduler::next_watering_date;

use super::mock_ports::FlakyStore;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn repo() -> PlantRepository<SqliteStore> {
    PlantRepository::open(SqliteStore::in_memory().unwrap()).unwrap()
}

fn aloe() -> PlantDraft {
    PlantDraft::new("Aloe Vera", 3, date("2025-08-20"))
        .location("Living Room")
        .image_uri("img.png")
}

#[test]
fn aloe_vera_lifecycle() {
    let mut repo = repo();
    assert!(repo.list().is_empty());

    let id = repo.add(&aloe()).unwrap();
    assert_eq!(id, PlantId(1));
    assert_eq!(repo.list().len(), 1);

    let plant = repo.get_by_id(id).unwrap();
    assert_eq!(plant.watering_interval, 3);
    assert_eq!(plant.location, "Living Room");
    assert_eq!(plant.image_uri.as_deref(), Some("img.png"));
    assert_eq!(next_watering_date(&plant), date("2025-08-23"));

    let edit = PlantDraft::new("Aloe Vera", 5, date("2025-08-21"))
        .location("Living Room")
        .image_uri("img.png");
    repo.update(id, &edit).unwrap();

    let plant = repo.get_by_id(id).unwrap();
    assert_eq!(plant.watering_interval, 5);
    assert_eq!(next_watering_date(&plant), date("2025-08-26"));
}

#[test]
fn name_is_stored_as_entered() {
    let mut repo = repo();
    let id = repo
        .add(&PlantDraft::new(" Aloe Vera ", 3, date("2025-08-20")))
        .unwrap();
    assert_eq!(repo.get_by_id(id).unwrap().name, " Aloe Vera ");

    let blank = PlantDraft::new("   ", 3, date("2025-08-20"));
    assert!(matches!(repo.add(&blank), Err(Error::Validation(_))));
    assert!(matches!(repo.update(id, &blank), Err(Error::Validation(_))));
    assert_eq!(repo.list().len(), 1);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let mut repo = repo();
    let first = repo.add(&aloe()).unwrap();
    repo.delete(first).unwrap();
    let second = repo.add(&aloe()).unwrap();
    assert_ne!(first, second);
}

#[test]
fn invalid_drafts_leave_store_unchanged() {
    let mut repo = repo();
    let id = repo.add(&aloe()).unwrap();
    let before = repo.list();

    let bad = [
        PlantDraft::new("", 3, date("2025-08-20")),
        PlantDraft::new("   ", 3, date("2025-08-20")),
        PlantDraft::new("Fern", 0, date("2025-08-20")),
        PlantDraft::new("Fern", -2, date("2025-08-20")),
    ];
    for draft in &bad {
        assert!(matches!(repo.add(draft), Err(Error::Validation(_))));
        assert!(matches!(repo.update(id, draft), Err(Error::Validation(_))));
    }
    assert_eq!(repo.list(), before);
}

#[test]
fn update_of_missing_plant_is_not_found() {
    let mut repo = repo();
    assert_eq!(
        repo.update(PlantId(42), &aloe()),
        Err(Error::NotFound(PlantId(42)))
    );
}

#[test]
fn delete_then_get_then_delete_again() {
    let mut repo = repo();
    let id = repo.add(&aloe()).unwrap();

    repo.delete(id).unwrap();
    assert_eq!(repo.get_by_id(id), None);
    assert_eq!(repo.delete(id), Err(Error::NotFound(id)));
}

#[test]
fn water_sets_last_watered_to_today() {
    let mut repo = repo();
    let id = repo.add(&aloe()).unwrap();

    let plant = repo.water(id, date("2025-08-30")).unwrap();
    assert_eq!(plant.last_watered, date("2025-08-30"));
    assert_eq!(next_watering_date(&plant), date("2025-09-02"));
    assert_eq!(repo.water(PlantId(9), date("2025-08-30")), Err(Error::NotFound(PlantId(9))));
}

#[test]
fn list_keeps_insertion_order() {
    let mut repo = repo();
    for name in ["Basil", "Cactus", "Aloe"] {
        repo.add(&PlantDraft::new(name, 2, date("2025-08-20"))).unwrap();
    }
    let names: Vec<_> = repo.list().into_iter().map(|p| p.name).collect();
    assert_eq!(names, ["Basil", "Cactus", "Aloe"]);
}

#[test]
fn legacy_table_is_migrated_and_rows_normalised() {
    let mut store = SqliteStore::in_memory().unwrap();
    store
        .execute(
            "CREATE TABLE plants (
                id INTEGER PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                location TEXT,
                wateringInterval INTEGER,
                lastWatered TEXT,
                imageUri TEXT
            );",
        )
        .unwrap();
    store
        .run(
            "INSERT INTO plants (name, location, wateringInterval, lastWatered, imageUri) VALUES (?1, ?2, ?3, ?4, ?5);",
            &[
                "Monstera".into(),
                SqlValue::Null,
                7i64.into(),
                "2025-08-20T09:15:00.000Z".into(),
                "".into(),
            ],
        )
        .unwrap();

    let mut repo = PlantRepository::open(store).unwrap();
    let plant = repo.get_by_id(PlantId(1)).unwrap();
    assert_eq!(plant.last_watered, date("2025-08-20"));
    assert_eq!(plant.location, "");
    assert_eq!(plant.image_uri, None);
    assert_eq!(plant.last_notified, None);

    repo.mark_notified(PlantId(1), date("2025-08-27")).unwrap();
    assert_eq!(
        repo.get_by_id(PlantId(1)).unwrap().last_notified,
        Some(date("2025-08-27"))
    );

    // Second init is a no-op.
    repo.init().unwrap();
}

#[test]
fn corrupt_rows_are_isolated() {
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
            INSERT INTO plants (name, wateringInterval, lastWatered) VALUES ('Good', 3, '2025-08-20');
            INSERT INTO plants (name, wateringInterval, lastWatered) VALUES ('NoDate', 3, 'yesterday');
            INSERT INTO plants (name, wateringInterval, lastWatered) VALUES ('Zero', 0, '2025-08-20');",
        )
        .unwrap();

    let repo = PlantRepository::open(store).unwrap();
    let entries = repo.load_all().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries[0].is_ok());
    assert!(matches!(entries[1], Err(Error::Storage(StoreError::Corrupted(_)))));
    assert!(matches!(entries[2], Err(Error::Storage(StoreError::Corrupted(_)))));

    let listed = repo.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Good");
    assert!(repo.try_get(PlantId(2)).is_err());
    assert_eq!(repo.get_by_id(PlantId(2)), None);
}

#[test]
fn read_faults_degrade_and_write_faults_propagate() {
    let (store, faults) = FlakyStore::new();
    let mut repo = PlantRepository::open(store).unwrap();
    let id = repo.add(&aloe()).unwrap();

    faults.fail_reads(true);
    assert!(repo.list().is_empty());
    assert_eq!(repo.get_by_id(id), None);
    assert!(repo.try_get(id).is_err());
    assert_eq!(repo.load_all().unwrap_err(), Error::Storage(StoreError::Unavailable));
    faults.fail_reads(false);

    faults.fail_writes(true);
    assert_eq!(repo.add(&aloe()), Err(Error::Storage(StoreError::Unavailable)));
    assert_eq!(repo.delete(id), Err(Error::Storage(StoreError::Unavailable)));
    faults.fail_writes(false);

    assert_eq!(repo.list().len(), 1);
}
