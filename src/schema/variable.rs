//! Variable domains.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::point::Scalar;

/// The domain a generator may draw a variable's value from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Variable {
    /// A closed real interval `[low, high]`.
    Continuous {
        /// Lower bound (inclusive).
        low: f64,
        /// Upper bound (inclusive).
        high: f64,
        /// Preferred starting value, used by local methods.
        default_value: Option<f64>,
    },
    /// A finite set of allowed values.
    Discrete {
        /// The allowed values, without duplicates.
        values: Vec<Scalar>,
    },
}

impl Variable {
    /// A continuous domain `[low, high]` without a default value.
    #[must_use]
    pub fn continuous(low: f64, high: f64) -> Self {
        Variable::Continuous {
            low,
            high,
            default_value: None,
        }
    }

    /// A discrete domain over the given values.
    #[must_use]
    pub fn discrete<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        Variable::Discrete {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `(low, high)` for continuous domains.
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Variable::Continuous { low, high, .. } => Some((*low, *high)),
            Variable::Discrete { .. } => None,
        }
    }

    /// Returns `true` for continuous domains.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        matches!(self, Variable::Continuous { .. })
    }

    /// Returns `true` if `value` lies in this domain.
    #[must_use]
    pub fn contains(&self, value: &Scalar) -> bool {
        match self {
            Variable::Continuous { low, high, .. } => value
                .as_f64()
                .is_some_and(|v| (*low..=*high).contains(&v)),
            Variable::Discrete { values } => values.contains(value),
        }
    }

    /// Checks domain well-formedness and normalizes the value set.
    pub(crate) fn validated(self, name: &str) -> Result<Self> {
        match self {
            Variable::Continuous {
                low,
                high,
                default_value,
            } => {
                if !low.is_finite() || !high.is_finite() {
                    return Err(Error::schema(name, "domain bounds must be finite"));
                }
                if low > high {
                    return Err(Error::schema(
                        name,
                        format!("lower bound {low} exceeds upper bound {high}"),
                    ));
                }
                if let Some(d) = default_value
                    && !(d.is_finite() && (low..=high).contains(&d))
                {
                    return Err(Error::schema(
                        name,
                        format!("default value {d} lies outside [{low}, {high}]"),
                    ));
                }
                Ok(Variable::Continuous {
                    low,
                    high,
                    default_value,
                })
            }
            Variable::Discrete { values } => {
                if values.is_empty() {
                    return Err(Error::schema(name, "discrete domain must not be empty"));
                }
                if values
                    .iter()
                    .any(|v| matches!(v, Scalar::Float(f) if f.is_nan()))
                {
                    return Err(Error::schema(name, "discrete values must not be NaN"));
                }
                let mut unique: Vec<Scalar> = Vec::with_capacity(values.len());
                for value in values {
                    if !unique.contains(&value) {
                        unique.push(value);
                    }
                }
                Ok(Variable::Discrete { values: unique })
            }
        }
    }
}
