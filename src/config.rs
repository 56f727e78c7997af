//! Application configuration parameters
//!
//! All tunable parameters for the watering core and its host process.
//! Values come from an optional JSON file; anything not in the file keeps
//! its default.  Loaded values are range-checked, never silently clamped.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // --- Storage ---
    /// SQLite database holding the `plants` table
    pub database_path: PathBuf,
    /// Key-value file holding the persisted settings
    pub settings_path: PathBuf,

    // --- Reminders ---
    /// Hour of day (0-23) on-demand reminders fire on the due date
    pub reminder_hour: u8,
    /// Minute (0-59) on-demand reminders fire on the due date
    pub reminder_minute: u8,
    /// Notification title
    pub reminder_title: String,
    /// Notification body; `{name}` is replaced by the plant name
    pub reminder_body: String,

    // --- Background scan ---
    /// Periodic scan cadence (seconds)
    pub scan_interval_secs: u32,
    /// How often the daemon wakes to check the cadence (seconds)
    pub daemon_poll_secs: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            // Storage
            database_path: PathBuf::from("plants.db"),
            settings_path: PathBuf::from("settings.json"),

            // Reminders
            reminder_hour: 9,
            reminder_minute: 0,
            reminder_title: "🌱 Reminder".into(),
            reminder_body: "{name} should be watered today 💧".into(),

            // Background scan
            scan_interval_secs: 24 * 60 * 60, // once a day
            daemon_poll_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("AppConfig: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        info!("AppConfig: loaded {}", path.display());
        Ok(config)
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.reminder_hour > 23 {
            return Err(Error::Config("reminder_hour must be 0–23".into()));
        }
        if self.reminder_minute > 59 {
            return Err(Error::Config("reminder_minute must be 0–59".into()));
        }
        if self.reminder_title.trim().is_empty() {
            return Err(Error::Config("reminder_title must not be empty".into()));
        }
        if !self.reminder_body.contains("{name}") {
            return Err(Error::Config(
                "reminder_body must contain the {name} placeholder".into(),
            ));
        }
        if !(60..=7 * 24 * 60 * 60).contains(&self.scan_interval_secs) {
            return Err(Error::Config(
                "scan_interval_secs must be 60–604800".into(),
            ));
        }
        if self.daemon_poll_secs == 0 || self.daemon_poll_secs > self.scan_interval_secs {
            return Err(Error::Config(
                "daemon_poll_secs must be 1–scan_interval_secs".into(),
            ));
        }
        Ok(())
    }

    /// Time of day on-demand reminders fire.
    pub fn reminder_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(
            u32::from(self.reminder_hour),
            u32::from(self.reminder_minute),
            0,
        )
        .unwrap_or(NaiveTime::MIN)
    }
}
