//! Scene: a stored activation command on the digitalSTROM server.
//!
//! Scenes are identified by zone, an optional color/group and a scene id.
//! They are fetched once at startup into a [`SceneRegistry`] and never
//! mutated locally.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known scene ids.
pub mod scene_ids {
    /// Area-wide "all off" for a zone/group.
    pub const BROADCAST_OFF: u8 = 0;
    /// Highest scene id that can anchor a light/cover pairing.
    pub const OFF_ANCHOR_MAX: u8 = 4;
    /// Distance between an off scene and its matching on scene.
    pub const ON_OFFSET: u8 = 5;
    /// Area-wide "all on" for a zone/group.
    pub const BROADCAST_ON: u8 = 5;
    /// Highest area/broadcast scene id of the light and cover groups.
    pub const AREA_MAX: u8 = 9;
    /// System scene "sleeping".
    pub const SLEEPING: u8 = 69;
    /// System scene "present".
    pub const PRESENT: u8 = 71;
    /// Distance between a switch's on scene and its off scene.
    pub const SWITCH_OFF_OFFSET: u8 = 1;
}

/// Color/group tag of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u8);

impl Color {
    /// Yellow group.
    pub const LIGHT: Self = Self(1);
    /// Grey group.
    pub const COVER: Self = Self(2);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether a scene belongs to a color group or is a generic/system scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneKind {
    Plain,
    ColorGroup { color: Color },
}

/// Composite registry key: `(zone, color?, scene id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneKey {
    pub zone_id: u32,
    pub color: Option<Color>,
    pub scene_id: u8,
}

impl SceneKey {
    #[must_use]
    pub const fn plain(zone_id: u32, scene_id: u8) -> Self {
        Self {
            zone_id,
            color: None,
            scene_id,
        }
    }

    #[must_use]
    pub const fn colored(zone_id: u32, color: Color, scene_id: u8) -> Self {
        Self {
            zone_id,
            color: Some(color),
            scene_id,
        }
    }

    /// Same zone and color, different scene id.
    #[must_use]
    pub const fn with_scene_id(self, scene_id: u8) -> Self {
        Self { scene_id, ..self }
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Some(color) => write!(f, "{}_{}_{}", self.zone_id, color, self.scene_id),
            None => write!(f, "{}_{}", self.zone_id, self.scene_id),
        }
    }
}

/// A scene descriptor as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub zone_id: u32,
    pub kind: SceneKind,
    pub scene_id: u8,
    pub name: String,
    /// Stable identifier assigned by the client library.
    pub unique_id: String,
}

impl Scene {
    /// A generic/system scene without a color group.
    #[must_use]
    pub fn plain(
        zone_id: u32,
        scene_id: u8,
        name: impl Into<String>,
        unique_id: impl Into<String>,
    ) -> Self {
        Self {
            zone_id,
            kind: SceneKind::Plain,
            scene_id,
            name: name.into(),
            unique_id: unique_id.into(),
        }
    }

    /// A scene bound to a color group.
    #[must_use]
    pub fn colored(
        zone_id: u32,
        color: Color,
        scene_id: u8,
        name: impl Into<String>,
        unique_id: impl Into<String>,
    ) -> Self {
        Self {
            zone_id,
            kind: SceneKind::ColorGroup { color },
            scene_id,
            name: name.into(),
            unique_id: unique_id.into(),
        }
    }

    #[must_use]
    pub fn color(&self) -> Option<Color> {
        match self.kind {
            SceneKind::Plain => None,
            SceneKind::ColorGroup { color } => Some(color),
        }
    }

    #[must_use]
    pub fn key(&self) -> SceneKey {
        SceneKey {
            zone_id: self.zone_id,
            color: self.color(),
            scene_id: self.scene_id,
        }
    }
}

/// Snapshot of every scene known to the server, keyed by [`SceneKey`].
///
/// Iteration is ordered by key so discovery is deterministic.
#[derive(Debug, Clone, Default)]
pub struct SceneRegistry {
    scenes: BTreeMap<SceneKey, Scene>,
}

impl SceneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a scene. A scene with the same key is replaced and returned.
    pub fn insert(&mut self, scene: Scene) -> Option<Scene> {
        self.scenes.insert(scene.key(), scene)
    }

    #[must_use]
    pub fn get(&self, key: &SceneKey) -> Option<&Scene> {
        self.scenes.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &SceneKey) -> bool {
        self.scenes.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl FromIterator<Scene> for SceneRegistry {
    fn from_iter<I: IntoIterator<Item = Scene>>(iter: I) -> Self {
        let mut registry = Self::new();
        for scene in iter {
            registry.insert(scene);
        }
        registry
    }
}
