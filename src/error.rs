//! Unified error type for the plant-watering core.
//!
//! Every fallible repository, scheduler and settings operation funnels into
//! [`Error`], so callers (UI layer, CLI host) handle one type.  Port-level
//! errors from [`crate::app::ports`] convert into it via `From`.

use core::fmt;

use crate::app::ports::{KvError, NotifyError, StoreError};
use crate::model::PlantId;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bad input to `add` / `update`.  Describes which field and why.
    Validation(&'static str),
    /// The operation referenced a plant id that does not exist.
    NotFound(PlantId),
    /// The durable plant store failed (I/O, corruption).
    Storage(StoreError),
    /// The notification sink refused or failed to schedule.  Non-fatal.
    Notification(NotifyError),
    /// The settings key-value store failed.
    Settings(KvError),
    /// Configuration file is unreadable or out of range.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::NotFound(id) => write!(f, "not found: plant {id}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Notification(e) => write!(f, "notification: {e}"),
            Self::Settings(e) => write!(f, "settings: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Storage(e)
    }
}

impl From<NotifyError> for Error {
    fn from(e: NotifyError) -> Self {
        Self::Notification(e)
    }
}

impl From<KvError> for Error {
    fn from(e: KvError) -> Self {
        Self::Settings(e)
    }
}

impl Error {
    /// Whether this error leaves the repository unchanged and is safe to
    /// show to the user as an input problem.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
