//! Entity state: the tri-state value held by every toggle entity.

use serde::{Deserialize, Serialize};

/// On/off state of an entity, or [`Unknown`](Self::Unknown) when nothing
/// has been observed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    On,
    Off,
    #[default]
    Unknown,
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl std::str::FromStr for EntityState {
    type Err = UnknownStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "unknown" => Ok(Self::Unknown),
            other => Err(UnknownStateError(other.to_string())),
        }
    }
}

/// Returned when parsing a state string that is not `on`, `off` or `unknown`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity state {0:?}")]
pub struct UnknownStateError(pub String);
