//! Temperature ramp states and image labels.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of the temperature ramp an image was taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RampState {
    /// Heating, stored under `Ramp_Up/`.
    Up,
    /// Cooling, stored under `Ramp_Down/`.
    Down,
}

impl RampState {
    /// Both states in acquisition order.
    pub const ALL: [RampState; 2] = [RampState::Up, RampState::Down];

    /// Name of the directory holding images for this state.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            RampState::Up => "Ramp_Up",
            RampState::Down => "Ramp_Down",
        }
    }
}

impl fmt::Display for RampState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for RampState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ramp_up" | "up" => Ok(RampState::Up),
            "ramp_down" | "down" => Ok(RampState::Down),
            _ => Err(Error::UnknownVariant {
                kind: "ramp state",
                value: s.to_string(),
            }),
        }
    }
}

/// Identifies one image of the stack: the ramp it belongs to and its file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageLabel {
    /// Ramp the image was taken on.
    pub state: RampState,
    /// File stem, usually the temperature (e.g. `"25"`).
    pub temperature: String,
}

impl ImageLabel {
    /// Creates a new label.
    pub fn new(state: RampState, temperature: impl Into<String>) -> Self {
        Self {
            state,
            temperature: temperature.into(),
        }
    }
}

impl fmt::Display for ImageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.state, self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_display() {
        let label = ImageLabel::new(RampState::Down, "150");
        assert_eq!(label.to_string(), "Ramp_Down 150");
    }

    #[test]
    fn test_parse_state() {
        assert_eq!("Ramp_Up".parse::<RampState>().unwrap(), RampState::Up);
        assert_eq!("down".parse::<RampState>().unwrap(), RampState::Down);
        assert!("sideways".parse::<RampState>().is_err());
    }
}
