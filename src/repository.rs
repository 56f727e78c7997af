//! Plant repository — durable CRUD over plant records.
//!
//! The repository exclusively owns its [`StorePort`]; every consumer reaches
//! the `plants` table through it.  No business logic lives here beyond
//! field validation ([`PlantDraft::validate`]) and row decoding.
//!
//! Failure policy:
//!
//! - writes (`add`, `update`, `water`, `delete`, `mark_notified`) propagate
//!   every store fault as [`Error::Storage`];
//! - reads (`list`, `get_by_id`) log the fault and degrade to an empty list
//!   or `None`, since the UI has no better fallback;
//! - [`PlantRepository::load_all`] is the strict read used by the periodic
//!   scan: a store fault is an error, a corrupt row is isolated to its entry.

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::app::ports::{Row, SqlValue, StoreError, StorePort};
use crate::error::{Error, Result};
use crate::model::{Plant, PlantDraft, PlantId, format_date, parse_date};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS plants (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name TEXT NOT NULL,
    location TEXT,
    wateringInterval INTEGER,
    lastWatered TEXT,
    imageUri TEXT,
    lastNotified TEXT
);";

const SELECT_PLANTS: &str = "SELECT id, name, location, wateringInterval, lastWatered, imageUri, lastNotified FROM plants";

pub struct PlantRepository<S: StorePort> {
    store: S,
}

impl<S: StorePort> PlantRepository<S> {
    /// Wrap a store without touching it.  Call [`init`](Self::init) before use,
    /// or use [`open`](Self::open).
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Wrap a store and make sure the schema exists.
    pub fn open(store: S) -> Result<Self> {
        let mut repo = Self::new(store);
        repo.init()?;
        Ok(repo)
    }

    /// Create the `plants` table, or migrate a table created by an older
    /// version that lacks the `lastNotified` column.
    pub fn init(&mut self) -> Result<()> {
        self.store.execute(CREATE_TABLE)?;

        let columns = self.store.query_all("PRAGMA table_info(plants)", &[])?;
        let has_ledger = columns.iter().any(|c| c.text("name") == Some("lastNotified"));
        if !has_ledger {
            info!("PlantRepository: adding lastNotified column to existing table");
            self.store
                .execute("ALTER TABLE plants ADD COLUMN lastNotified TEXT;")?;
        }
        Ok(())
    }

    // ── Writes ────────────────────────────────────────────────

    /// Insert a new plant and return its freshly assigned id.
    pub fn add(&mut self, draft: &PlantDraft) -> Result<PlantId> {
        self.insert(draft).map(|plant| plant.id)
    }

    /// Insert a new plant and return the record as written, without reading
    /// it back.  Once the insert succeeded this never fails.
    pub fn insert(&mut self, draft: &PlantDraft) -> Result<Plant> {
        let fields = draft.validate()?;
        let summary = self.store.run(
            "INSERT INTO plants (name, location, wateringInterval, lastWatered, imageUri) VALUES (?1, ?2, ?3, ?4, ?5);",
            &[
                fields.name.as_str().into(),
                fields.location.as_str().into(),
                fields.watering_interval.into(),
                format_date(fields.last_watered).into(),
                fields.image_uri.clone().unwrap_or_default().into(),
            ],
        )?;
        let id = PlantId(summary.last_insert_id);
        info!("PlantRepository: added plant {} '{}'", id, fields.name);
        Ok(Plant {
            id,
            name: fields.name,
            location: fields.location,
            watering_interval: fields.watering_interval,
            last_watered: fields.last_watered,
            image_uri: fields.image_uri,
            last_notified: None,
        })
    }

    /// Overwrite every mutable field in one statement.
    pub fn update(&mut self, id: PlantId, draft: &PlantDraft) -> Result<()> {
        let fields = draft.validate()?;
        let summary = self.store.run(
            "UPDATE plants SET name = ?1, location = ?2, wateringInterval = ?3, lastWatered = ?4, imageUri = ?5 WHERE id = ?6;",
            &[
                fields.name.as_str().into(),
                fields.location.as_str().into(),
                fields.watering_interval.into(),
                format_date(fields.last_watered).into(),
                fields.image_uri.clone().unwrap_or_default().into(),
                id.into(),
            ],
        )?;
        if summary.changes == 0 {
            return Err(Error::NotFound(id));
        }
        info!("PlantRepository: updated plant {}", id);
        Ok(())
    }

    /// Set `lastWatered` to `today` and return the updated record.
    pub fn water(&mut self, id: PlantId, today: NaiveDate) -> Result<Plant> {
        let summary = self.store.run(
            "UPDATE plants SET lastWatered = ?1 WHERE id = ?2;",
            &[format_date(today).into(), id.into()],
        )?;
        if summary.changes == 0 {
            return Err(Error::NotFound(id));
        }
        info!("PlantRepository: plant {} watered on {}", id, today);
        self.try_get(id)?.ok_or(Error::NotFound(id))
    }

    /// Permanently remove a plant.  A second delete of the same id fails.
    pub fn delete(&mut self, id: PlantId) -> Result<()> {
        let summary = self
            .store
            .run("DELETE FROM plants WHERE id = ?1;", &[id.into()])?;
        if summary.changes == 0 {
            return Err(Error::NotFound(id));
        }
        info!("PlantRepository: deleted plant {}", id);
        Ok(())
    }

    /// Record that the periodic scan reminded about this plant on `date`.
    pub fn mark_notified(&mut self, id: PlantId, date: NaiveDate) -> Result<()> {
        let summary = self.store.run(
            "UPDATE plants SET lastNotified = ?1 WHERE id = ?2;",
            &[format_date(date).into(), id.into()],
        )?;
        if summary.changes == 0 {
            return Err(Error::NotFound(id));
        }
        debug!("PlantRepository: plant {} notified on {}", id, date);
        Ok(())
    }

    // ── Reads ─────────────────────────────────────────────────

    /// Look up one plant.  Missing ids and store faults both yield `None`.
    pub fn get_by_id(&self, id: PlantId) -> Option<Plant> {
        match self.try_get(id) {
            Ok(plant) => plant,
            Err(e) => {
                warn!("PlantRepository: get_by_id({}) failed: {}", id, e);
                None
            }
        }
    }

    /// Strict lookup: `Ok(None)` for a missing id, `Err` on store faults.
    pub fn try_get(&self, id: PlantId) -> Result<Option<Plant>> {
        let rows = self
            .store
            .query_all(&format!("{SELECT_PLANTS} WHERE id = ?1;"), &[id.into()])?;
        match rows.first() {
            Some(row) => Ok(Some(decode_row(row)?)),
            None => Ok(None),
        }
    }

    /// All plants in insertion order.  Store faults and corrupt rows are
    /// logged and left out.
    pub fn list(&self) -> Vec<Plant> {
        match self.load_all() {
            Ok(entries) => entries
                .into_iter()
                .filter_map(|entry| {
                    entry
                        .map_err(|e| warn!("PlantRepository: skipping record: {}", e))
                        .ok()
                })
                .collect(),
            Err(e) => {
                warn!("PlantRepository: list failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Snapshot for the periodic scan: one entry per stored row.
    pub fn load_all(&self) -> Result<Vec<Result<Plant>>> {
        let rows = self
            .store
            .query_all(&format!("{SELECT_PLANTS} ORDER BY id;"), &[])?;
        Ok(rows
            .iter()
            .map(|row| decode_row(row).map_err(Error::from))
            .collect())
    }

    /// Borrow the underlying store (tests, diagnostics).
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Decode a `plants` row, treating NULL text columns the way older app
/// versions wrote them (empty).  An unusable interval or date is corruption,
/// never silently coerced.
fn decode_row(row: &Row) -> core::result::Result<Plant, StoreError> {
    let id = row
        .integer("id")
        .map(PlantId)
        .ok_or_else(|| StoreError::Corrupted("row without id".into()))?;

    let name = row
        .text("name")
        .ok_or_else(|| StoreError::Corrupted(format!("plant {id}: missing name")))?
        .to_owned();

    let watering_interval = row
        .integer("wateringInterval")
        .filter(|days| *days > 0)
        .and_then(|days| u32::try_from(days).ok())
        .ok_or_else(|| {
            StoreError::Corrupted(format!("plant {id}: watering interval missing or not positive"))
        })?;

    let last_watered = row
        .text("lastWatered")
        .and_then(|s| parse_date(s).ok())
        .ok_or_else(|| StoreError::Corrupted(format!("plant {id}: invalid last watered date")))?;

    let last_notified = match row.get("lastNotified") {
        Some(SqlValue::Text(s)) => parse_date(s).ok(),
        _ => None,
    };

    Ok(Plant {
        id,
        name,
        location: row.text("location").unwrap_or_default().to_owned(),
        watering_interval,
        last_watered,
        image_uri: row
            .text("imageUri")
            .filter(|uri| !uri.is_empty())
            .map(str::to_owned),
        last_notified,
    })
}
