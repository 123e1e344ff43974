//! # dsbridge-domain
//!
//! Pure domain model for the dsbridge digitalSTROM bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Scenes** (stored activation commands keyed by zone, color and scene id)
//!   and the read-only **Scene Registry** fetched from the server
//! - Define the **Pairing heuristic** that turns pairs of scenes into lights,
//!   covers and switches
//! - Define **Entities** (state holders exposed to users) and their tri-state
//! - Parse inbound `callScene` events and compute per-entity **transitions**
//! - Define **Services** (`turn_on`, `turn_off`, `activate`) and internal bus **Events**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod connection;
pub mod entity;
pub mod event;
pub mod pairing;
pub mod scene;
pub mod service;
pub mod transition;
