//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — write a log line, refresh a list
//! view, etc.

use chrono::NaiveDate;

use crate::model::PlantId;
use crate::settings::SettingKey;

use super::ports::Trigger;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    PlantAdded { id: PlantId, name: String },

    PlantUpdated { id: PlantId },

    /// The plant was watered; carries the recomputed due date.
    PlantWatered { id: PlantId, next_due: NaiveDate },

    PlantDeleted { id: PlantId },

    /// A reminder was handed to the notification sink.
    ReminderScheduled { plant_id: PlantId, trigger: Trigger },

    /// The sink refused a reminder.  The triggering mutation still stands.
    ReminderFailed { plant_id: PlantId, reason: String },

    /// A periodic scan finished.
    ScanCompleted(ScanSummary),

    SettingChanged { key: SettingKey, value: bool },
}

/// Counters from one periodic scan, suitable for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub date: NaiveDate,
    pub examined: usize,
    pub reminded: usize,
    /// Due today but already reminded earlier today.
    pub already_notified: usize,
    pub failed: usize,
}
