//! Log-backed notification adapter.
//!
//! Implements [`NotificationPort`] for hosts without an OS notification
//! service (CLI, daemon, tests).  Immediate reminders are written to the log
//! as they arrive; timed reminders are kept in a pending table, one per
//! plant, until cancelled or delivered by [`LogNotifier::deliver_due`].
//! A platform adapter (Android/iOS local notifications) would implement the
//! same trait.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use log::info;

use crate::app::ports::{
    NotificationHandle, NotificationPort, NotifyError, Permission, Reminder, Trigger,
};
use crate::model::PlantId;

pub struct LogNotifier {
    permission: Permission,
    pending: BTreeMap<PlantId, (NotificationHandle, Reminder)>,
    next_handle: u64,
    delivered: usize,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self {
            permission: Permission::Granted,
            pending: BTreeMap::new(),
            next_handle: 1,
            delivered: 0,
        }
    }

    /// Simulate the user denying notification permission.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// The pending timed reminder for `plant`, if any.
    pub fn pending_for(&self, plant: PlantId) -> Option<&Reminder> {
        self.pending.get(&plant).map(|(_, reminder)| reminder)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Reminders written to the log so far.
    pub fn delivered_count(&self) -> usize {
        self.delivered
    }

    /// Deliver every pending reminder whose time has come.
    pub fn deliver_due(&mut self, now: NaiveDateTime) -> usize {
        let due: Vec<PlantId> = self
            .pending
            .iter()
            .filter(|(_, (_, r))| matches!(r.trigger, Trigger::At(at) if at <= now))
            .map(|(id, _)| *id)
            .collect();
        for id in &due {
            if let Some((_, reminder)) = self.pending.remove(id) {
                self.deliver(&reminder);
            }
        }
        due.len()
    }

    fn deliver(&mut self, reminder: &Reminder) {
        self.delivered += 1;
        info!("NOTIFY | {} | {}", reminder.title, reminder.body);
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationPort for LogNotifier {
    fn request_permission(&mut self) -> Permission {
        self.permission
    }

    fn schedule(&mut self, reminder: &Reminder) -> Result<NotificationHandle, NotifyError> {
        if self.permission == Permission::Denied {
            return Err(NotifyError::PermissionDenied);
        }
        let handle = NotificationHandle(format!("log-{}", self.next_handle));
        self.next_handle += 1;

        match reminder.trigger {
            Trigger::Immediate => self.deliver(reminder),
            Trigger::At(_) => {
                self.pending
                    .insert(reminder.plant_id, (handle.clone(), reminder.clone()));
            }
        }
        Ok(handle)
    }

    fn cancel_for_plant(&mut self, plant: PlantId) -> Result<(), NotifyError> {
        if let Some((handle, _)) = self.pending.remove(&plant) {
            info!("NOTIFY | cancelled {} for plant {}", handle.0, plant);
        }
        Ok(())
    }
}
