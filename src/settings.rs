//! Process-wide user settings.
//!
//! Two boolean flags, `darkMode` and `notifications`, loaded once at start
//! and written back on every change.  The flags are persisted together as a
//! single postcard blob through a [`KvPort`], so a reader never observes one
//! flag updated and the other stale.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{KvError, KvPort};
use crate::error::{Error, Result};

const SETTINGS_NAMESPACE: &str = "plantcare";
const SETTINGS_KEY: &str = "settings";

/// Setting names as exposed to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    DarkMode,
    Notifications,
}

impl SettingKey {
    pub const ALL: [SettingKey; 2] = [SettingKey::DarkMode, SettingKey::Notifications];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DarkMode => "darkMode",
            Self::Notifications => "notifications",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(Error::Validation("unknown setting (expected darkMode or notifications)"))
    }
}

/// Snapshot of every setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub dark_mode: bool,
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            notifications: true,
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::DarkMode => self.dark_mode,
            SettingKey::Notifications => self.notifications,
        }
    }

    fn with(mut self, key: SettingKey, value: bool) -> Self {
        match key {
            SettingKey::DarkMode => self.dark_mode = value,
            SettingKey::Notifications => self.notifications = value,
        }
        self
    }

    /// Key → value view for the UI layer.
    pub fn as_map(&self) -> BTreeMap<&'static str, bool> {
        SettingKey::ALL
            .into_iter()
            .map(|key| (key.as_str(), self.get(key)))
            .collect()
    }
}

/// Owns the settings storage and the in-memory copy.
pub struct SettingsStore<K: KvPort> {
    kv: K,
    current: Settings,
}

impl<K: KvPort> SettingsStore<K> {
    /// Read the persisted settings.  A missing, unreadable or undecodable
    /// blob yields the defaults; loading never fails.
    pub fn load(kv: K) -> Self {
        let current = match kv.read(SETTINGS_NAMESPACE, SETTINGS_KEY) {
            Ok(bytes) => match postcard::from_bytes::<Settings>(&bytes) {
                Ok(settings) => {
                    info!("SettingsStore: loaded {:?}", settings);
                    settings
                }
                Err(_) => {
                    warn!("SettingsStore: stored settings corrupted, using defaults");
                    Settings::default()
                }
            },
            Err(KvError::NotFound) => {
                info!("SettingsStore: no stored settings, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!("SettingsStore: read failed ({}), using defaults", e);
                Settings::default()
            }
        };
        Self { kv, current }
    }

    pub fn current(&self) -> Settings {
        self.current
    }

    pub fn get(&self, key: SettingKey) -> bool {
        self.current.get(key)
    }

    /// Change one setting and persist immediately.
    ///
    /// Returns whether the value changed.  On a write failure the in-memory
    /// value is left as it was, matching what is stored.
    pub fn set(&mut self, key: SettingKey, value: bool) -> Result<bool> {
        if self.current.get(key) == value {
            return Ok(false);
        }
        let next = self.current.with(key, value);
        let bytes = postcard::to_allocvec(&next).map_err(|_| KvError::Corrupted)?;
        self.kv.write(SETTINGS_NAMESPACE, SETTINGS_KEY, &bytes)?;
        self.current = next;
        info!("SettingsStore: {} = {}", key, value);
        Ok(true)
    }

    /// Flip a setting; returns the new value.
    pub fn toggle(&mut self, key: SettingKey) -> Result<bool> {
        let value = !self.get(key);
        self.set(key, value)?;
        Ok(value)
    }

    /// Forget the stored blob and go back to defaults.
    pub fn reset(&mut self) -> Result<()> {
        self.kv.delete(SETTINGS_NAMESPACE, SETTINGS_KEY)?;
        self.current = Settings::default();
        Ok(())
    }

    pub fn into_inner(self) -> K {
        self.kv
    }
}
