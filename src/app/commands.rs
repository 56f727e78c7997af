//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (UI, CLI,
//! background trigger) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

use crate::model::{PlantDraft, PlantId};
use crate::settings::SettingKey;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    AddPlant(PlantDraft),

    /// Overwrite every mutable field of an existing plant.
    UpdatePlant { id: PlantId, draft: PlantDraft },

    /// "Water today": set the last-watered date to the current date.
    WaterPlant(PlantId),

    DeletePlant(PlantId),

    /// Run the all-plants sweep (normally from the background trigger).
    RunScan,

    /// Flip a persisted setting (saved immediately).
    SetSetting { key: SettingKey, value: bool },
}
