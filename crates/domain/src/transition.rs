//! Event-to-state transition rule for toggle entities.
//!
//! Each entity is a flat on/off machine. A [`SceneCall`] either matches its
//! on scene, its off scene, or nothing. Re-applying the same call is
//! idempotent; there is no debouncing.

use crate::entity::{DeviceClass, EntityState};
use crate::event::SceneCall;
use crate::pairing::Pairing;
use crate::scene::{Color, Scene, scene_ids};

/// Compute the state a pairing moves to when `call` is observed.
///
/// Light and cover pairings need the call's group id. Besides their own on
/// and off scene ids they also follow the zone/group broadcasts
/// ([`BROADCAST_ON`](scene_ids::BROADCAST_ON) and
/// [`BROADCAST_OFF`](scene_ids::BROADCAST_OFF)). Switch pairings ignore the
/// group and only match their exact scene ids.
#[must_use]
pub fn transition(pairing: &Pairing, call: &SceneCall) -> Option<EntityState> {
    match pairing.class {
        DeviceClass::Light | DeviceClass::Cover => {
            let group = Color(call.group_id?);
            if in_group(&pairing.on, call.zone_id, group)
                && (call.scene_id == pairing.on.scene_id || call.scene_id == scene_ids::BROADCAST_ON)
            {
                Some(EntityState::On)
            } else if in_group(&pairing.off, call.zone_id, group)
                && (call.scene_id == pairing.off.scene_id
                    || call.scene_id == scene_ids::BROADCAST_OFF)
            {
                Some(EntityState::Off)
            } else {
                None
            }
        }
        DeviceClass::Switch => {
            if is_scene(&pairing.on, call) {
                Some(EntityState::On)
            } else if is_scene(&pairing.off, call) {
                Some(EntityState::Off)
            } else {
                None
            }
        }
        DeviceClass::Scene => None,
    }
}

fn in_group(scene: &Scene, zone_id: u32, group: Color) -> bool {
    scene.zone_id == zone_id && scene.color() == Some(group)
}

fn is_scene(scene: &Scene, call: &SceneCall) -> bool {
    scene.zone_id == call.zone_id && scene.scene_id == call.scene_id
}
