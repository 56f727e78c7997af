//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  A UI refresh hook would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, Trigger};

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::PlantAdded { id, name } => {
                info!("PLANT | added id={} name='{}'", id, name);
            }
            AppEvent::PlantUpdated { id } => {
                info!("PLANT | updated id={}", id);
            }
            AppEvent::PlantWatered { id, next_due } => {
                info!("PLANT | watered id={} next_due={}", id, next_due);
            }
            AppEvent::PlantDeleted { id } => {
                info!("PLANT | deleted id={}", id);
            }
            AppEvent::ReminderScheduled { plant_id, trigger } => match trigger {
                Trigger::Immediate => info!("REMIND | plant={} now", plant_id),
                Trigger::At(at) => info!("REMIND | plant={} at={}", plant_id, at),
            },
            AppEvent::ReminderFailed { plant_id, reason } => {
                warn!("REMIND | plant={} failed: {}", plant_id, reason);
            }
            AppEvent::ScanCompleted(s) => {
                info!(
                    "SCAN | date={} | examined={} reminded={} already={} failed={}",
                    s.date, s.examined, s.reminded, s.already_notified, s.failed
                );
            }
            AppEvent::SettingChanged { key, value } => {
                info!("SETTING | {}={}", key, value);
            }
        }
    }
}

/// Sink that keeps every event, for tests and UI polling.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
