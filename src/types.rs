//! Core types for the generator protocol.

use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// What a generator should do with an objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum Direction {
    /// Minimize the objective value.
    Minimize,
    /// Maximize the objective value.
    Maximize,
    /// Explore the objective landscape without preferring either extreme.
    Explore,
}

impl Direction {
    /// Returns `true` if `a` is strictly better than `b` under this direction.
    ///
    /// `Explore` has no preference, so nothing is ever better.
    #[must_use]
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Direction::Minimize => a < b,
            Direction::Maximize => a > b,
            Direction::Explore => false,
        }
    }

    /// Maps a raw objective value to a loss that is always minimized.
    #[must_use]
    pub fn to_loss(self, value: f64) -> f64 {
        match self {
            Direction::Maximize => -value,
            Direction::Minimize | Direction::Explore => value,
        }
    }

    /// The canonical upper-case tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Minimize => "MINIMIZE",
            Direction::Maximize => "MAXIMIZE",
            Direction::Explore => "EXPLORE",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    /// Parses a case-insensitive tag such as `"minimize"` or `"MAXIMIZE"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MINIMIZE" => Ok(Direction::Minimize),
            "MAXIMIZE" => Ok(Direction::Maximize),
            "EXPLORE" => Ok(Direction::Explore),
            _ => Err(Error::schema(
                "objectives",
                format!("objective type '{s}' is not supported"),
            )),
        }
    }
}

/// The lifecycle state of a generator.
///
/// `Proposing` and `Ingesting` are only held for the duration of a call;
/// between calls a live generator is always `Ready`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GeneratorState {
    /// Under construction.
    Uninitialized,
    /// Idle and accepting calls.
    Ready,
    /// Inside `propose`.
    Proposing,
    /// Inside `ingest` or `finalize`.
    Ingesting,
    /// `finalize` has completed; no further calls succeed.
    Finalized,
}
