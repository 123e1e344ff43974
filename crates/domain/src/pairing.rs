//! Pairing heuristic: groups scenes into on/off devices.
//!
//! digitalSTROM has no notion of a "light" or a "cover" on the scene level,
//! only scenes. Lights and covers are inferred from color-group scenes whose
//! ids differ by [`ON_OFFSET`](scene_ids::ON_OFFSET); switches from the two
//! presence system scenes and their successor.
//!
//! | Class  | Anchor                          | Counterpart                 |
//! |--------|---------------------------------|-----------------------------|
//! | Light  | color 1, id `0..=4` (off)       | `(zone, 1, id + 5)` (on)    |
//! | Cover  | color 2, id `0..=4` (off)       | `(zone, 2, id + 5)` (on)    |
//! | Switch | no color, id `69` or `71` (on)  | `(zone, id + 1)` (off)      |
//!
//! Anchors without a counterpart are skipped.

use crate::entity::{DeviceClass, DeviceInfo, EntityState};
use crate::id::EntityId;
use crate::scene::{Color, Scene, SceneKey, SceneKind, SceneRegistry, scene_ids};

/// Two scenes acting as one toggle-capable device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub class: DeviceClass,
    pub on: Scene,
    pub off: Scene,
}

impl Pairing {
    /// The scene whose identity names the entity.
    ///
    /// Lights and covers are anchored on their off scene, switches on their
    /// on scene.
    #[must_use]
    pub fn anchor(&self) -> &Scene {
        match self.class {
            DeviceClass::Switch => &self.on,
            DeviceClass::Light | DeviceClass::Cover | DeviceClass::Scene => &self.off,
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.class.entity_id(&self.anchor().unique_id)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.anchor().name
    }

    #[must_use]
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::new(self.class, &self.off)
    }

    /// State assumed when nothing was persisted.
    ///
    /// Sleeping starts off and present starts on, mirroring the usual
    /// real-world situation; everything else is unknown.
    #[must_use]
    pub fn default_state(&self) -> EntityState {
        match (self.class, self.on.scene_id) {
            (DeviceClass::Switch, scene_ids::SLEEPING) => EntityState::Off,
            (DeviceClass::Switch, scene_ids::PRESENT) => EntityState::On,
            _ => EntityState::Unknown,
        }
    }
}

/// Pair scenes of the given device class.
///
/// [`DeviceClass::Scene`] has no pairs and yields an empty list.
#[must_use]
pub fn pairings(registry: &SceneRegistry, class: DeviceClass) -> Vec<Pairing> {
    match class {
        DeviceClass::Light | DeviceClass::Cover => class
            .color()
            .map(|color| pair_color_group(registry, color))
            .unwrap_or_default(),
        DeviceClass::Switch => pair_switches(registry),
        DeviceClass::Scene => Vec::new(),
    }
}

/// Pair each off anchor of a color group with the scene five above it.
///
/// Only the light and cover groups form pairs; any other color yields an
/// empty list.
#[must_use]
pub fn pair_color_group(registry: &SceneRegistry, color: Color) -> Vec<Pairing> {
    let class = if color == Color::LIGHT {
        DeviceClass::Light
    } else if color == Color::COVER {
        DeviceClass::Cover
    } else {
        return Vec::new();
    };
    registry
        .iter()
        .filter(|scene| scene.color() == Some(color))
        // area and broadcast scenes above the anchor range would pair twice
        .filter(|scene| scene.scene_id <= scene_ids::OFF_ANCHOR_MAX)
        .filter_map(|off| {
            let on_key =
                SceneKey::colored(off.zone_id, color, off.scene_id + scene_ids::ON_OFFSET);
            let on = registry.get(&on_key)?;
            Some(Pairing {
                class,
                on: on.clone(),
                off: off.clone(),
            })
        })
        .collect()
}

/// Pair the presence scenes (sleeping, present) with the scene one above.
#[must_use]
pub fn pair_switches(registry: &SceneRegistry) -> Vec<Pairing> {
    registry
        .iter()
        .filter(|scene| scene.kind == SceneKind::Plain)
        .filter(|scene| matches!(scene.scene_id, scene_ids::SLEEPING | scene_ids::PRESENT))
        .filter_map(|on| {
            let off_key =
                SceneKey::plain(on.zone_id, on.scene_id + scene_ids::SWITCH_OFF_OFFSET);
            let off = registry.get(&off_key)?;
            Some(Pairing {
                class: DeviceClass::Switch,
                on: on.clone(),
                off: off.clone(),
            })
        })
        .collect()
}

/// Every scene that is not an area/broadcast scene of the light or cover group.
#[must_use]
pub fn plain_scenes(registry: &SceneRegistry) -> Vec<Scene> {
    registry
        .iter()
        .filter(|scene| !is_area_scene(scene))
        .cloned()
        .collect()
}

fn is_area_scene(scene: &Scene) -> bool {
    matches!(scene.color(), Some(Color::LIGHT | Color::COVER))
        && scene.scene_id <= scene_ids::AREA_MAX
}

/// Result of running every heuristic over a registry.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub lights: Vec<Pairing>,
    pub covers: Vec<Pairing>,
    pub switches: Vec<Pairing>,
    pub scenes: Vec<Scene>,
}

impl Discovery {
    /// All pairings, lights first.
    pub fn pairings(&self) -> impl Iterator<Item = &Pairing> {
        self.lights
            .iter()
            .chain(self.covers.iter())
            .chain(self.switches.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len() + self.covers.len() + self.switches.len() + self.scenes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run the pairing heuristic for every device class.
#[must_use]
pub fn discover(registry: &SceneRegistry) -> Discovery {
    Discovery {
        lights: pairings(registry, DeviceClass::Light),
        covers: pairings(registry, DeviceClass::Cover),
        switches: pairings(registry, DeviceClass::Switch),
        scenes: plain_scenes(registry),
    }
}
