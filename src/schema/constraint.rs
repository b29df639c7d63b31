//! Output constraints.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Relative tolerance used by [`Constraint::EqualTo`].
pub const EQUALITY_TOLERANCE: f64 = 1e-9;

/// A comparison an evaluated output must satisfy for a point to be feasible.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Constraint {
    /// `value < threshold`.
    LessThan(f64),
    /// `value > threshold`.
    GreaterThan(f64),
    /// `value == threshold`, within [`EQUALITY_TOLERANCE`] relative to `max(1, |threshold|)`.
    EqualTo(f64),
    /// `low <= value <= high`.
    Bounds(f64, f64),
}

impl Constraint {
    /// Returns `true` if `x` satisfies the constraint.
    #[must_use]
    pub fn check(&self, x: f64) -> bool {
        match *self {
            Constraint::LessThan(v) => x < v,
            Constraint::GreaterThan(v) => x > v,
            Constraint::EqualTo(v) => (x - v).abs() <= EQUALITY_TOLERANCE * v.abs().max(1.0),
            Constraint::Bounds(lo, hi) => (lo..=hi).contains(&x),
        }
    }

    /// Distance from `x` to the satisfied region; zero when `x` is on or
    /// inside its boundary. NaN inputs are infinitely far away.
    #[must_use]
    pub fn violation(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::INFINITY;
        }
        match *self {
            Constraint::LessThan(v) => (x - v).max(0.0),
            Constraint::GreaterThan(v) => (v - x).max(0.0),
            Constraint::EqualTo(v) => {
                if self.check(x) {
                    0.0
                } else {
                    (x - v).abs()
                }
            }
            Constraint::Bounds(lo, hi) => (lo - x).max(x - hi).max(0.0),
        }
    }

    /// The canonical upper-case tag of this constraint kind.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Constraint::LessThan(_) => "LESS_THAN",
            Constraint::GreaterThan(_) => "GREATER_THAN",
            Constraint::EqualTo(_) => "EQUAL_TO",
            Constraint::Bounds(..) => "BOUNDS",
        }
    }

    /// The numeric arguments in tag order.
    #[must_use]
    pub fn args(&self) -> Vec<f64> {
        match *self {
            Constraint::LessThan(v) | Constraint::GreaterThan(v) | Constraint::EqualTo(v) => {
                vec![v]
            }
            Constraint::Bounds(lo, hi) => vec![lo, hi],
        }
    }

    /// Builds a constraint from a case-insensitive tag and its arguments,
    /// e.g. `("less_than", &[1.0])` or `("BOUNDS", &[0.0, 1.0])`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaValidation`] naming `name` for unknown tags or
    /// the wrong number of arguments.
    pub fn parse(name: &str, tag: &str, args: &[f64]) -> Result<Self> {
        let tag = tag.to_ascii_uppercase();
        let constraint = match (tag.as_str(), args) {
            ("LESS_THAN", [v]) => Constraint::LessThan(*v),
            ("GREATER_THAN", [v]) => Constraint::GreaterThan(*v),
            ("EQUAL_TO", [v]) => Constraint::EqualTo(*v),
            ("BOUNDS", [lo, hi]) => Constraint::Bounds(*lo, *hi),
            ("LESS_THAN" | "GREATER_THAN" | "EQUAL_TO" | "BOUNDS", _) => {
                return Err(Error::schema(
                    name,
                    format!(
                        "constraint {tag} is not correctly specified: got {} arguments",
                        args.len()
                    ),
                ));
            }
            _ => {
                return Err(Error::schema(
                    name,
                    format!("constraint type '{tag}' is not supported"),
                ));
            }
        };
        constraint.validated(name)
    }

    pub(crate) fn validated(self, name: &str) -> Result<Self> {
        if self.args().iter().any(|v| !v.is_finite()) {
            return Err(Error::schema(name, "constraint thresholds must be finite"));
        }
        if let Constraint::Bounds(lo, hi) = self
            && lo >= hi
        {
            return Err(Error::schema(
                name,
                format!("bounds [{lo}, {hi}] must be in ascending order"),
            ));
        }
        Ok(self)
    }
}

impl core::fmt::Display for Constraint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Constraint::LessThan(v) => write!(f, "< {v}"),
            Constraint::GreaterThan(v) => write!(f, "> {v}"),
            Constraint::EqualTo(v) => write!(f, "== {v}"),
            Constraint::Bounds(lo, hi) => write!(f, "in [{lo}, {hi}]"),
        }
    }
}
