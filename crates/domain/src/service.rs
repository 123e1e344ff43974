//! Service: a command a user can invoke on an entity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Commands accepted by entities.
///
/// Toggle entities (lights, covers, switches) accept `turn_on`/`turn_off`;
/// plain scenes accept `activate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    TurnOn,
    TurnOff,
    Activate,
}

impl Service {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::Activate => "activate",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "turn_on" | "open_cover" => Ok(Self::TurnOn),
            "turn_off" | "close_cover" => Ok(Self::TurnOff),
            "activate" => Ok(Self::Activate),
            other => Err(ValidationError::UnknownService(other.to_string())),
        }
    }
}
