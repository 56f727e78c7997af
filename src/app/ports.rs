//! Port traits — the hexagonal boundary between the watering core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService / PlantRepository / WateringScheduler
//! ```
//!
//! Driven adapters (SQLite, key-value file, OS notifications, wall clock,
//! log output) implement these traits.  The core consumes them via generics,
//! so it never touches a concrete database or notification API.
//!
//! ## Contract notes
//!
//! - **StorePort** is owned by exactly one `PlantRepository`; nothing else
//!   writes through it.
//! - **NotificationPort** keeps at most one pending reminder per plant when
//!   callers cancel before rescheduling, which the scheduler always does.
//! - All port errors are typed; callers must handle every variant.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::PlantId;

// ───────────────────────────────────────────────────────────────
// Store port (driven adapter: domain ↔ embedded relational store)
// ───────────────────────────────────────────────────────────────

/// A bound parameter or a column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<PlantId> for SqlValue {
    fn from(id: PlantId) -> Self {
        Self::Integer(id.0)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// One result row, columns in select order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new(columns: Vec<(String, SqlValue)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Integer column; `None` if missing, NULL or not an integer.
    pub fn integer(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            SqlValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Text column; `None` if missing, NULL or not text.
    pub fn text(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            SqlValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows inserted, updated or deleted.
    pub changes: usize,
    /// Rowid of the most recent insert on this connection.
    pub last_insert_id: i64,
}

/// Minimal relational capability the repository depends on.
///
/// Each call is a single statement and therefore atomic in any SQL engine;
/// the repository never needs multi-statement transactions.
pub trait StorePort {
    /// Run DDL or a statement batch without parameters.
    fn execute(&mut self, sql: &str) -> Result<(), StoreError>;

    /// Run a query and collect every row.
    fn query_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError>;

    /// Run a single write statement with bound parameters.
    fn run(&mut self, sql: &str, params: &[SqlValue]) -> Result<RunSummary, StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Notification port (driven adapter: domain → OS notifications)
// ───────────────────────────────────────────────────────────────

/// When a reminder should fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Deliver now (periodic scan).
    Immediate,
    /// Deliver at a local date-time (on-demand reschedule).
    At(NaiveDateTime),
}

/// A request to remind the user to water one plant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub plant_id: PlantId,
    pub trigger: Trigger,
    pub title: String,
    pub body: String,
}

/// Opaque identifier the sink returns for a scheduled reminder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationHandle(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Local notification capability.
pub trait NotificationPort {
    /// Ask the platform for permission to post notifications.
    fn request_permission(&mut self) -> Permission;

    /// Schedule one reminder.
    fn schedule(&mut self, reminder: &Reminder) -> Result<NotificationHandle, NotifyError>;

    /// Cancel every pending reminder for `plant`.  `Ok(())` if none exist.
    fn cancel_for_plant(&mut self, plant: PlantId) -> Result<(), NotifyError>;
}

// ───────────────────────────────────────────────────────────────
// Key-value port (driven adapter: domain ↔ settings storage)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for small blobs (settings).
///
/// Keys are namespaced to prevent collisions between subsystems.  Writes
/// must be atomic per key.
pub trait KvPort {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, KvError>;

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), KvError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), KvError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Local wall clock.  Injected so due-date logic is testable on fixed dates.
pub trait ClockPort {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / UI refresh)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s through
/// this port.  Adapters decide where they go (log, UI refresh hook, ...).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`StorePort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The engine rejected or failed the statement.
    Query(String),
    /// A stored row could not be decoded into a valid record.
    Corrupted(String),
    /// The underlying connection is gone or could not be opened.
    Unavailable,
}

/// Errors from [`NotificationPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    PermissionDenied,
    /// The platform refused the request.
    Rejected(String),
    Unavailable,
}

/// Errors from [`KvPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    /// Requested key does not exist.
    NotFound,
    /// Stored blob failed to decode.
    Corrupted,
    IoError(String),
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Query(msg) => write!(f, "query failed: {}", msg),
            Self::Corrupted(msg) => write!(f, "corrupt record: {}", msg),
            Self::Unavailable => write!(f, "store unavailable"),
        }
    }
}

impl core::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Rejected(msg) => write!(f, "rejected: {}", msg),
            Self::Unavailable => write!(f, "notification service unavailable"),
        }
    }
}

impl core::fmt::Display for KvError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Corrupted => write!(f, "value corrupted"),
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
impl std::error::Error for NotifyError {}
impl std::error::Error for KvError {}
