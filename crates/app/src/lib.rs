//! # dsbridge-app
//!
//! Application layer: **port definitions** (traits) and the pieces that turn
//! a scene registry into live entities.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `SceneClient`: authenticate, fetch scenes, call a scene, run the outbound stack
//!   - `EventSource`: push raw server events into a channel
//!   - `StateRepository`: remember the last known state of each entity
//!   - `EventPublisher`: publish bus events
//!   - `Integration`: what the HTTP surface and the daemon drive
//! - Entity adapters (`ToggleEntity`, `SceneEntity`) holding live state
//! - The `EventDispatcher` fanning parsed scene calls out to entities
//! - `DigitalStromIntegration`: setup with retry, start/stop lifecycle
//! - `IntegrationRegistry`: explicitly owned map of configured servers
//!
//! ## Dependency rule
//! Depends on `dsbridge-domain` only (plus `tokio` for channels and tasks).
//! Never imports adapter crates.

pub mod dispatcher;
pub mod entities;
pub mod event_bus;
pub mod integration;
pub mod ports;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;
