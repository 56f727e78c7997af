//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the plant repository, the settings store and the
//! watering scheduler, together with the notification and clock ports it
//! drives.  Event output flows through an [`EventSink`] passed at each call
//! site, so the same service can log in the CLI and refresh a view in a UI.
//!
//! ```text
//!  StorePort ──▶ ┌───────────────────────────────────┐ ──▶ EventSink
//!                │            AppService             │
//!     KvPort ◀──▶│ Repository · Scheduler · Settings │ ──▶ NotificationPort
//!                └───────────────────────────────────┘
//!                                  ▲
//!                              ClockPort
//! ```
//!
//! Mutations are never rolled back because of a notification problem: the
//! outcome carries a [`ReminderStatus`] instead.

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::model::{Plant, PlantDraft, PlantId};
use crate::repository::PlantRepository;
use crate::scheduler::{
    DueStatus, ScanReport, WateringScheduler, is_due_on, next_watering_date, sort_by_due,
};
use crate::settings::{SettingKey, Settings, SettingsStore};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{
    ClockPort, EventSink, KvPort, NotificationHandle, NotificationPort, StorePort, Trigger,
};

// ───────────────────────────────────────────────────────────────
// Outcome types
// ───────────────────────────────────────────────────────────────

/// What happened to the reminder after a plant mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderStatus {
    Scheduled(NotificationHandle),
    /// The `notifications` setting is off.
    Disabled,
    /// Due now, but the plant was already reminded today.
    AlreadyNotified,
    /// The sink failed; the mutation itself succeeded.
    Failed(Error),
}

/// Result of `add` / `update` / `water`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// The record as stored after the mutation.
    pub plant: Plant,
    pub reminder: ReminderStatus,
}

/// A plant decorated for the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantView {
    pub plant: Plant,
    pub next_watering: NaiveDate,
    pub due: DueStatus,
}

/// Reply to [`AppService::handle_command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Plant(MutationOutcome),
    Deleted(PlantId),
    Scan(ScanReport),
    Setting { key: SettingKey, value: bool, changed: bool },
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService<S, K, N, C>
where
    S: StorePort,
    K: KvPort,
    N: NotificationPort,
    C: ClockPort,
{
    repo: PlantRepository<S>,
    settings: SettingsStore<K>,
    scheduler: WateringScheduler,
    notifier: N,
    clock: C,
}

impl<S, K, N, C> AppService<S, K, N, C>
where
    S: StorePort,
    K: KvPort,
    N: NotificationPort,
    C: ClockPort,
{
    /// Assemble the service.  The repository must already be initialised
    /// ([`PlantRepository::open`]) and the settings loaded.
    pub fn new(
        config: &AppConfig,
        repo: PlantRepository<S>,
        settings: SettingsStore<K>,
        notifier: N,
        clock: C,
    ) -> Self {
        info!("AppService started, settings {:?}", settings.current());
        Self {
            repo,
            settings,
            scheduler: WateringScheduler::new(config),
            notifier,
            clock,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn get(&self, id: PlantId) -> Option<Plant> {
        self.repo.get_by_id(id)
    }

    /// Plants in insertion order.
    pub fn list(&self) -> Vec<Plant> {
        self.repo.list()
    }

    /// Plants sorted by next watering date with their due labels.
    pub fn list_by_due(&self) -> Vec<PlantView> {
        let today = self.clock.today();
        let mut plants = self.repo.list();
        sort_by_due(&mut plants);
        plants
            .into_iter()
            .map(|plant| PlantView {
                next_watering: next_watering_date(&plant),
                due: DueStatus::for_plant(&plant, today),
                plant,
            })
            .collect()
    }

    pub fn settings(&self) -> Settings {
        self.settings.current()
    }

    pub fn repository(&self) -> &PlantRepository<S> {
        &self.repo
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ── Plant mutations ───────────────────────────────────────

    pub fn add_plant(&mut self, draft: &PlantDraft, sink: &mut impl EventSink) -> Result<MutationOutcome> {
        let plant = self.repo.insert(draft)?;
        sink.emit(&AppEvent::PlantAdded {
            id: plant.id,
            name: plant.name.clone(),
        });
        let reminder = self.schedule_reminder(&plant, sink);
        Ok(MutationOutcome { plant, reminder })
    }

    pub fn update_plant(
        &mut self,
        id: PlantId,
        draft: &PlantDraft,
        sink: &mut impl EventSink,
    ) -> Result<MutationOutcome> {
        self.repo.update(id, draft)?;
        let plant = self.repo.try_get(id)?.ok_or(Error::NotFound(id))?;
        sink.emit(&AppEvent::PlantUpdated { id });
        let reminder = self.schedule_reminder(&plant, sink);
        Ok(MutationOutcome { plant, reminder })
    }

    /// "Water today".
    pub fn water_plant(&mut self, id: PlantId, sink: &mut impl EventSink) -> Result<MutationOutcome> {
        let plant = self.repo.water(id, self.clock.today())?;
        sink.emit(&AppEvent::PlantWatered {
            id,
            next_due: next_watering_date(&plant),
        });
        let reminder = self.schedule_reminder(&plant, sink);
        Ok(MutationOutcome { plant, reminder })
    }

    /// Delete a plant and drop its pending reminder.
    pub fn delete_plant(&mut self, id: PlantId, sink: &mut impl EventSink) -> Result<()> {
        self.repo.delete(id)?;
        sink.emit(&AppEvent::PlantDeleted { id });
        if let Err(e) = self.scheduler.cancel(id, &mut self.notifier) {
            warn!("AppService: could not cancel reminder for deleted plant {}: {}", id, e);
            sink.emit(&AppEvent::ReminderFailed {
                plant_id: id,
                reason: e.to_string(),
            });
        }
        Ok(())
    }

    // ── Periodic scan ─────────────────────────────────────────

    /// Entry point for the background trigger.
    pub fn run_periodic_scan(&mut self, sink: &mut impl EventSink) -> ScanReport {
        let today = self.clock.today();
        let report = if self.settings.get(SettingKey::Notifications) {
            self.scheduler
                .run_periodic_scan(&mut self.repo, today, &mut self.notifier)
        } else {
            info!("AppService: notifications disabled, scan skipped");
            ScanReport::empty(today)
        };
        sink.emit(&AppEvent::ScanCompleted(report.summary()));
        report
    }

    // ── Settings ──────────────────────────────────────────────

    /// Change a setting.  Turning notifications off cancels every pending
    /// reminder; turning them back on reschedules one per plant.
    pub fn set_setting(&mut self, key: SettingKey, value: bool, sink: &mut impl EventSink) -> Result<bool> {
        let changed = self.settings.set(key, value)?;
        if !changed {
            return Ok(false);
        }
        sink.emit(&AppEvent::SettingChanged { key, value });

        if key == SettingKey::Notifications {
            if value {
                self.reschedule_all(sink);
            } else {
                for plant in self.repo.list() {
                    if let Err(e) = self.scheduler.cancel(plant.id, &mut self.notifier) {
                        warn!("AppService: could not cancel reminder for plant {}: {}", plant.id, e);
                    }
                }
            }
        }
        Ok(true)
    }

    // ── Host lifecycle ────────────────────────────────────────

    /// Give every stored plant its on-demand reminder again.  A host whose
    /// notifier forgets pending reminders on exit calls this at start-up.
    ///
    /// Returns how many reminders were handed to the notifier.
    pub fn reschedule_all(&mut self, sink: &mut impl EventSink) -> usize {
        let mut scheduled = 0;
        for plant in self.repo.list() {
            if matches!(self.schedule_reminder(&plant, sink), ReminderStatus::Scheduled(_)) {
                scheduled += 1;
            }
        }
        info!("AppService: rescheduled {} reminder(s)", scheduled);
        scheduled
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (UI, CLI, background trigger).
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) -> Result<CommandReply> {
        match cmd {
            AppCommand::AddPlant(draft) => self.add_plant(&draft, sink).map(CommandReply::Plant),
            AppCommand::UpdatePlant { id, draft } => {
                self.update_plant(id, &draft, sink).map(CommandReply::Plant)
            }
            AppCommand::WaterPlant(id) => self.water_plant(id, sink).map(CommandReply::Plant),
            AppCommand::DeletePlant(id) => {
                self.delete_plant(id, sink)?;
                Ok(CommandReply::Deleted(id))
            }
            AppCommand::RunScan => Ok(CommandReply::Scan(self.run_periodic_scan(sink))),
            AppCommand::SetSetting { key, value } => {
                let changed = self.set_setting(key, value, sink)?;
                Ok(CommandReply::Setting { key, value, changed })
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// On-demand trigger after a plant changed.
    fn schedule_reminder(&mut self, plant: &Plant, sink: &mut impl EventSink) -> ReminderStatus {
        if !self.settings.get(SettingKey::Notifications) {
            return ReminderStatus::Disabled;
        }
        let now = self.clock.now();
        let trigger = self.scheduler.trigger_for(plant, now);
        if trigger == Trigger::Immediate && plant.last_notified == Some(now.date()) {
            debug!("AppService: plant {} already reminded today", plant.id);
            return ReminderStatus::AlreadyNotified;
        }
        match self.scheduler.reschedule(plant, now, &mut self.notifier) {
            Ok(handle) => {
                sink.emit(&AppEvent::ReminderScheduled {
                    plant_id: plant.id,
                    trigger,
                });
                // An immediate reminder on the due date is that day's
                // reminder; the periodic scan must not repeat it.
                if trigger == Trigger::Immediate && is_due_on(plant, now.date()) {
                    if let Err(e) = self.repo.mark_notified(plant.id, now.date()) {
                        warn!("AppService: could not record reminder for plant {}: {}", plant.id, e);
                    }
                }
                ReminderStatus::Scheduled(handle)
            }
            Err(e) => {
                warn!("AppService: reminder for plant {} not scheduled: {}", plant.id, e);
                sink.emit(&AppEvent::ReminderFailed {
                    plant_id: plant.id,
                    reason: e.to_string(),
                });
                ReminderStatus::Failed(e.into())
            }
        }
    }
}
