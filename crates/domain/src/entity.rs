//! Entity: what users see and control.
//!
//! Every entity is backed by one scene (plain scenes) or a pair of scenes
//! (lights, covers, switches). [`Entity`] is an immutable snapshot handed
//! out by the application layer; live state sits in the app's adapters.

mod state;

pub use state::{EntityState, UnknownStateError};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DsBridgeError, ValidationError};
use crate::id::EntityId;
use crate::scene::{Color, Scene};
use crate::time::{Timestamp, now};

/// Manufacturer reported for every device.
pub const MANUFACTURER: &str = "digitalSTROM AG";

/// Kind of entity a scene (or scene pair) is exposed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Light,
    Cover,
    Switch,
    Scene,
}

impl DeviceClass {
    /// Namespace prefix of entity ids of this class.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Light => "dslight_",
            Self::Cover => "dscover_",
            Self::Switch => "dsswitch_",
            Self::Scene => "dsscene_",
        }
    }

    #[must_use]
    pub const fn model(self) -> &'static str {
        match self {
            Self::Light => "DSLight",
            Self::Cover => "DSCover",
            Self::Switch => "DSSwitch",
            Self::Scene => "DSScene",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Cover => "cover",
            Self::Switch => "switch",
            Self::Scene => "scene",
        }
    }

    /// Color group backing this class, for color-paired classes.
    #[must_use]
    pub const fn color(self) -> Option<Color> {
        match self {
            Self::Light => Some(Color::LIGHT),
            Self::Cover => Some(Color::COVER),
            Self::Switch | Self::Scene => None,
        }
    }

    /// Build the namespaced entity id for a scene unique id.
    #[must_use]
    pub fn entity_id(self, unique_id: &str) -> EntityId {
        EntityId::new(format!("{}{unique_id}", self.id_prefix()))
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device registry information attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Unique id of the backing scene.
    pub identifier: String,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
}

impl DeviceInfo {
    #[must_use]
    pub fn new(class: DeviceClass, scene: &Scene) -> Self {
        Self {
            identifier: scene.unique_id.clone(),
            name: scene.name.clone(),
            model: class.model().to_string(),
            manufacturer: MANUFACTURER.to_string(),
        }
    }
}

/// Snapshot of an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub class: DeviceClass,
    pub name: String,
    pub state: EntityState,
    pub device: DeviceInfo,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DsBridgeError::Validation`] when `id` is empty.
    pub fn validate(&self) -> Result<(), DsBridgeError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyEntityId.into());
        }
        Ok(())
    }

    /// Apply a new state, bumping `last_changed` only when it differs.
    pub fn update_state(&mut self, state: EntityState, ts: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = ts;
        }
        self.last_updated = ts;
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    class: Option<DeviceClass>,
    name: Option<String>,
    state: EntityState,
    device: Option<DeviceInfo>,
    last_changed: Option<Timestamp>,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn class(mut self, class: DeviceClass) -> Self {
        self.class = Some(class);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn device(mut self, device: DeviceInfo) -> Self {
        self.device = Some(device);
        self
    }

    #[must_use]
    pub fn last_changed(mut self, ts: Timestamp) -> Self {
        self.last_changed = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// Missing timestamps default to now; a missing device is derived from
    /// the name and class.
    ///
    /// # Errors
    ///
    /// Returns [`DsBridgeError::Validation`] if `id` is missing or empty.
    pub fn build(self) -> Result<Entity, DsBridgeError> {
        let class = self.class.unwrap_or(DeviceClass::Scene);
        let name = self.name.unwrap_or_default();
        let id = self.id.unwrap_or_else(|| EntityId::new(String::new()));
        let device = self.device.unwrap_or_else(|| DeviceInfo {
            identifier: id.to_string(),
            name: name.clone(),
            model: class.model().to_string(),
            manufacturer: MANUFACTURER.to_string(),
        });
        let ts = now();
        let entity = Entity {
            id,
            class,
            name,
            state: self.state,
            device,
            last_changed: self.last_changed.unwrap_or(ts),
            last_updated: ts,
        };
        entity.validate()?;
        Ok(entity)
    }
}
