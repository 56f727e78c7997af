//! PlantCare core library.
//!
//! The plant-watering domain engine: a plant repository over an injected
//! relational store, a watering scheduler that derives due dates and
//! reminders, and a persisted settings store.  All storage, notification
//! and clock access goes through the port traits in [`app::ports`]; the
//! concrete adapters live in [`adapters`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod model;
pub mod repository;
pub mod scheduler;
pub mod settings;

mod error;

pub use error::{Error, Result};
