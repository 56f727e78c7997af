//! Watering scheduler — due dates, reminder policy and the periodic scan.
//!
//! The scheduler holds no plant state of its own.  Every decision is a
//! projection of the current repository contents plus today's date:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Trigger Sources                        │
//! │                                                              │
//! │   ┌──────────────────────┐         ┌──────────────────────┐  │
//! │   │ User edit / watered  │         │ Background trigger   │  │
//! │   │ (on-demand)          │         │ (~daily ScanCadence) │  │
//! │   └──────────┬───────────┘         └──────────┬───────────┘  │
//! │              ▼                                ▼              │
//! │     reschedule(plant)               run_periodic_scan(repo)  │
//! │     cancel + schedule At(due)       Immediate per due plant  │
//! │              │                                │              │
//! │              └──────────────┬─────────────────┘              │
//! │                             ▼                                │
//! │                     NotificationPort                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per plant the conceptual states are `NeedsNoReminder → Due → (watered) →
//! NeedsNoReminder`; nothing here persists that state except the
//! `lastNotified` ledger the scan uses to stay idempotent within a day.

use core::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use log::{info, warn};

use crate::app::events::ScanSummary;
use crate::app::ports::{
    NotificationHandle, NotificationPort, NotifyError, Permission, Reminder, StorePort, Trigger,
};
use crate::config::AppConfig;
use crate::error::Error;
use crate::model::{Plant, PlantId};
use crate::repository::PlantRepository;

// ═══════════════════════════════════════════════════════════════
//  Due-date arithmetic
// ═══════════════════════════════════════════════════════════════

/// `last_watered + watering_interval` days.  Saturates at the end of the
/// calendar range instead of overflowing.
pub fn next_watering_date(plant: &Plant) -> NaiveDate {
    plant
        .last_watered
        .checked_add_days(Days::new(u64::from(plant.watering_interval)))
        .unwrap_or(NaiveDate::MAX)
}

/// Whole days from `today` until the next watering; negative when overdue.
pub fn days_until_due(plant: &Plant, today: NaiveDate) -> i64 {
    (next_watering_date(plant) - today).num_days()
}

/// Whether the periodic scan should remind about `plant` on `date`.
///
/// Only the exact due date counts; overdue plants were reminded on their
/// due date already.
pub fn is_due_on(plant: &Plant, date: NaiveDate) -> bool {
    next_watering_date(plant) == date
}

/// User-facing due label.  Overdue collapses into "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    DueToday,
    DueIn(u32),
}

impl DueStatus {
    pub fn for_plant(plant: &Plant, today: NaiveDate) -> Self {
        let days = days_until_due(plant, today);
        if days <= 0 {
            Self::DueToday
        } else {
            Self::DueIn(u32::try_from(days).unwrap_or(u32::MAX))
        }
    }

    pub fn is_due(self) -> bool {
        self == Self::DueToday
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DueToday => write!(f, "due today"),
            Self::DueIn(1) => write!(f, "in 1 day"),
            Self::DueIn(days) => write!(f, "in {days} days"),
        }
    }
}

/// Order plants for the list view: soonest next watering first, ties by id.
pub fn sort_by_due(plants: &mut [Plant]) {
    plants.sort_by_key(|p| (next_watering_date(p), p.id));
}

// ═══════════════════════════════════════════════════════════════
//  Scan report
// ═══════════════════════════════════════════════════════════════

/// Result of one periodic sweep.  Per-plant faults are collected here
/// instead of aborting the sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub date: NaiveDate,
    /// Stored rows looked at (including corrupt ones).
    pub examined: usize,
    /// Plants a reminder was emitted for.
    pub reminded: Vec<PlantId>,
    /// Plants due today that were already reminded today.
    pub already_notified: Vec<PlantId>,
    pub failures: Vec<ScanFailure>,
    /// Set when the sweep could not start at all (store down, no permission).
    pub aborted: Option<Error>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    /// `None` when the row was too corrupt to yield an id.
    pub plant_id: Option<PlantId>,
    pub error: Error,
}

/// Coarse result handed back to the background trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// At least one reminder went out and nothing failed.
    NewData,
    NoData,
    Failed,
}

impl ScanReport {
    /// A report with nothing examined (empty store, or scan skipped).
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            examined: 0,
            reminded: Vec::new(),
            already_notified: Vec::new(),
            failures: Vec::new(),
            aborted: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.failures.is_empty()
    }

    pub fn outcome(&self) -> ScanOutcome {
        if !self.is_success() {
            ScanOutcome::Failed
        } else if self.reminded.is_empty() {
            ScanOutcome::NoData
        } else {
            ScanOutcome::NewData
        }
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            date: self.date,
            examined: self.examined,
            reminded: self.reminded.len(),
            already_notified: self.already_notified.len(),
            failed: self.failures.len() + usize::from(self.aborted.is_some()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Builds reminders and drives the notification port.
///
/// The port is passed in at each call rather than owned, so the same
/// scheduler serves the foreground service and a background task.
#[derive(Debug, Clone)]
pub struct WateringScheduler {
    /// Time of day on-demand reminders fire on the due date.
    reminder_time: NaiveTime,
    title: String,
    /// Body text; `{name}` is replaced by the plant name.
    body_template: String,
}

impl WateringScheduler {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            reminder_time: config.reminder_time(),
            title: config.reminder_title.clone(),
            body_template: config.reminder_body.clone(),
        }
    }

    /// Reminder text for `plant`.
    pub fn reminder_for(&self, plant: &Plant, trigger: Trigger) -> Reminder {
        Reminder {
            plant_id: plant.id,
            trigger,
            title: self.title.clone(),
            body: self.body_template.replace("{name}", &plant.name),
        }
    }

    /// When the on-demand reminder for `plant` should fire, given `now`.
    ///
    /// A due instant that is already past becomes an immediate reminder.
    pub fn trigger_for(&self, plant: &Plant, now: NaiveDateTime) -> Trigger {
        let due_at = next_watering_date(plant).and_time(self.reminder_time);
        if due_at > now {
            Trigger::At(due_at)
        } else {
            Trigger::Immediate
        }
    }

    /// On-demand path: replace any pending reminder for `plant` with exactly
    /// one at its next watering date.
    pub fn reschedule(
        &self,
        plant: &Plant,
        now: NaiveDateTime,
        notifier: &mut impl NotificationPort,
    ) -> Result<NotificationHandle, NotifyError> {
        if notifier.request_permission() == Permission::Denied {
            return Err(NotifyError::PermissionDenied);
        }
        notifier.cancel_for_plant(plant.id)?;

        let reminder = self.reminder_for(plant, self.trigger_for(plant, now));
        let handle = notifier.schedule(&reminder)?;
        info!(
            "Scheduler: plant {} reminder {:?} ({})",
            plant.id, reminder.trigger, handle.0
        );
        Ok(handle)
    }

    /// Drop the pending reminder of a plant (deletion).
    pub fn cancel(&self, plant: PlantId, notifier: &mut impl NotificationPort) -> Result<(), NotifyError> {
        notifier.cancel_for_plant(plant)
    }

    /// Periodic path: one immediate reminder for every plant due exactly
    /// `today` that was not already reminded today.
    ///
    /// Never panics or returns early on a single plant's fault; everything
    /// ends up in the returned [`ScanReport`].
    pub fn run_periodic_scan<S: StorePort>(
        &self,
        repo: &mut PlantRepository<S>,
        today: NaiveDate,
        notifier: &mut impl NotificationPort,
    ) -> ScanReport {
        let mut report = ScanReport::empty(today);

        let entries = match repo.load_all() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Scheduler: scan could not load plants: {}", e);
                report.aborted = Some(e);
                return report;
            }
        };

        let mut permission_checked = false;
        for entry in entries {
            report.examined += 1;

            let plant = match entry {
                Ok(plant) => plant,
                Err(e) => {
                    warn!("Scheduler: skipping unreadable plant: {}", e);
                    report.failures.push(ScanFailure { plant_id: None, error: e });
                    continue;
                }
            };

            if !is_due_on(&plant, today) {
                continue;
            }
            if plant.last_notified == Some(today) {
                report.already_notified.push(plant.id);
                continue;
            }

            if !permission_checked {
                if notifier.request_permission() == Permission::Denied {
                    warn!("Scheduler: notification permission denied, scan aborted");
                    report.aborted = Some(Error::Notification(NotifyError::PermissionDenied));
                    return report;
                }
                permission_checked = true;
            }

            // A timed on-demand reminder for today would repeat this one.
            if let Err(e) = notifier.cancel_for_plant(plant.id) {
                warn!("Scheduler: could not cancel pending reminder for plant {}: {}", plant.id, e);
            }
            let reminder = self.reminder_for(&plant, Trigger::Immediate);
            if let Err(e) = notifier.schedule(&reminder) {
                warn!("Scheduler: reminder for plant {} failed: {}", plant.id, e);
                report.failures.push(ScanFailure {
                    plant_id: Some(plant.id),
                    error: e.into(),
                });
                continue;
            }
            report.reminded.push(plant.id);

            if let Err(e) = repo.mark_notified(plant.id, today) {
                warn!("Scheduler: could not record reminder for plant {}: {}", plant.id, e);
                report.failures.push(ScanFailure {
                    plant_id: Some(plant.id),
                    error: e,
                });
            }
        }

        info!(
            "Scheduler: scan {} examined={} reminded={} skipped={} failed={}",
            today,
            report.examined,
            report.reminded.len(),
            report.already_notified.len(),
            report.failures.len()
        );
        report
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scan cadence
// ═══════════════════════════════════════════════════════════════

/// Decides when a long-running host should invoke the periodic scan.
///
/// Fires at most once per calendar day and at least every `interval`,
/// whichever comes later, so a host waking from sleep at 00:05 still scans
/// the new day exactly once.
#[derive(Debug, Clone)]
pub struct ScanCadence {
    interval: TimeDelta,
    last_run: Option<NaiveDateTime>,
}

impl ScanCadence {
    pub fn new(interval_secs: u32) -> Self {
        Self {
            interval: TimeDelta::seconds(i64::from(interval_secs)),
            last_run: None,
        }
    }

    /// Whether a scan is due at `now`.
    pub fn should_run(&self, now: NaiveDateTime) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now.date() > last.date() || now - last >= self.interval,
        }
    }

    pub fn mark_ran(&mut self, now: NaiveDateTime) {
        self.last_run = Some(now);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
