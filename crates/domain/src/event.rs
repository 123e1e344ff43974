//! Events: inbound `callScene` notifications and internal bus records.
//!
//! The digitalSTROM event feed is best-effort: anything that does not look
//! like a well-formed scene call is dropped without raising an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{EntityId, EventId};
use crate::time::{Timestamp, now};

/// Event name of a scene activation on the server's event feed.
pub const SCENE_CALL_EVENT: &str = "callScene";

/// A parsed scene activation pushed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneCall {
    pub zone_id: u32,
    /// Only present for color-group scenes.
    pub group_id: Option<u8>,
    pub scene_id: u8,
}

impl SceneCall {
    /// Parse a raw event of the shape
    /// `{"name": "callScene", "properties": {"zoneID": …, "groupID": …, "sceneID": …}}`.
    ///
    /// Ids may be JSON numbers or numeric strings. Returns `None` when the
    /// name differs, or the zone or scene id is missing or not numeric. A
    /// group id that cannot be read is treated as absent.
    #[must_use]
    pub fn from_json(event: &Value) -> Option<Self> {
        if event.get("name")?.as_str()? != SCENE_CALL_EVENT {
            return None;
        }
        let properties = event.get("properties")?;

        let zone_id = u32::try_from(int_like(properties.get("zoneID")?)?).ok()?;
        let scene_id = u8::try_from(int_like(properties.get("sceneID")?)?).ok()?;
        let group_id = properties
            .get("groupID")
            .and_then(int_like)
            .and_then(|raw| u8::try_from(raw).ok());

        Some(Self {
            zone_id,
            group_id,
            scene_id,
        })
    }

    /// Render the call in the server's event shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut properties = serde_json::Map::new();
        properties.insert("zoneID".to_string(), Value::from(self.zone_id));
        if let Some(group_id) = self.group_id {
            properties.insert("groupID".to_string(), Value::from(group_id));
        }
        properties.insert("sceneID".to_string(), Value::from(self.scene_id));

        serde_json::json!({
            "name": SCENE_CALL_EVENT,
            "properties": properties,
        })
    }
}

fn int_like(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Kind of record published on the internal event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    EntityRegistered,
    StateChanged,
    SceneActivated,
}

/// An immutable record of something that happened inside the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub entity_id: Option<EntityId>,
    pub data: Value,
    pub timestamp: Timestamp,
}

impl Event {
    #[must_use]
    pub fn new(event_type: EventType, entity_id: Option<EntityId>, data: Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            timestamp: now(),
        }
    }
}
