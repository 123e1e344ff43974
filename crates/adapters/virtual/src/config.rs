//! Simulated server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use dsbridge_domain::connection::slugify;
use dsbridge_domain::scene::{Color, Scene, SceneRegistry};

/// One scene stored on the simulated server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualScene {
    pub zone: u32,
    /// Color group; absent for generic and system scenes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
    pub scene: u8,
    pub name: String,
}

impl VirtualScene {
    #[must_use]
    pub fn plain(zone: u32, scene: u8, name: &str) -> Self {
        Self {
            zone,
            color: None,
            scene,
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn colored(zone: u32, color: Color, scene: u8, name: &str) -> Self {
        Self {
            zone,
            color: Some(color.0),
            scene,
            name: name.to_string(),
        }
    }

    /// Build the domain scene, with a unique id namespaced by the apartment.
    #[must_use]
    pub fn to_scene(&self, apartment_slug: &str) -> Scene {
        let mut scene = match self.color {
            Some(color) => Scene::colored(self.zone, Color(color), self.scene, &self.name, ""),
            None => Scene::plain(self.zone, self.scene, &self.name, ""),
        };
        scene.unique_id = format!("{apartment_slug}_{}", scene.key());
        scene
    }
}

/// A small apartment: a living room light with two presets, kitchen and
/// bedroom lights, living room blinds, the presence switches and a couple of
/// plain scenes.
#[must_use]
pub fn demo_scenes() -> Vec<VirtualScene> {
    vec![
        VirtualScene::colored(1, Color::LIGHT, 0, "Living room off"),
        VirtualScene::colored(1, Color::LIGHT, 5, "Living room on"),
        VirtualScene::colored(1, Color::LIGHT, 1, "Living room dim off"),
        VirtualScene::colored(1, Color::LIGHT, 6, "Living room dim"),
        VirtualScene::colored(1, Color::LIGHT, 17, "Living room movie"),
        VirtualScene::colored(1, Color::COVER, 0, "Living room blinds down"),
        VirtualScene::colored(1, Color::COVER, 5, "Living room blinds up"),
        VirtualScene::colored(2, Color::LIGHT, 0, "Kitchen off"),
        VirtualScene::colored(2, Color::LIGHT, 5, "Kitchen on"),
        VirtualScene::colored(3, Color::LIGHT, 0, "Bedroom off"),
        VirtualScene::colored(3, Color::LIGHT, 5, "Bedroom on"),
        VirtualScene::colored(3, Color::LIGHT, 2, "Bedroom reading off"),
        VirtualScene::plain(0, 69, "Sleeping"),
        VirtualScene::plain(0, 70, "Wake up"),
        VirtualScene::plain(0, 71, "Present"),
        VirtualScene::plain(0, 72, "Absent"),
        VirtualScene::plain(0, 76, "Door bell"),
    ]
}

/// Settings of a [`VirtualServer`](crate::VirtualServer).
#[derive(Debug, Clone)]
pub struct VirtualConfig {
    /// Apartment name; its slug prefixes every scene unique id.
    pub apartment: String,
    /// App token the server accepts.
    pub token: String,
    pub stack_delay: Duration,
    pub scenes: Vec<VirtualScene>,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            apartment: "Apartment".to_string(),
            token: String::new(),
            stack_delay: Duration::from_millis(500),
            scenes: demo_scenes(),
        }
    }
}

impl VirtualConfig {
    #[must_use]
    pub fn apartment_slug(&self) -> String {
        slugify(&self.apartment)
    }

    /// Registry built from the configured scenes. Later duplicates win.
    #[must_use]
    pub fn registry(&self) -> SceneRegistry {
        let slug = self.apartment_slug();
        self.scenes
            .iter()
            .map(|scene| scene.to_scene(&slug))
            .collect()
    }
}
