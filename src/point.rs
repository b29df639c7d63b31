//! Dynamic field records exchanged between generators and their callers.
//!
//! A [`Point`] is an ordered map from field name to [`Scalar`]. Proposals carry
//! variables, constants, and the reserved identifier key [`ID_KEY`]; results
//! additionally carry objective, constraint, and observable values.
//!
//! ```
//! use optgen::{Point, Scalar};
//!
//! let mut point = Point::new();
//! point.insert("x", 0.5);
//! point.insert("label", "baseline");
//!
//! assert_eq!(point.get_f64("x"), Some(0.5));
//! assert_eq!(point.get("label"), Some(&Scalar::Text("baseline".into())));
//! assert_eq!(point.id(), None);
//! ```

use std::collections::BTreeMap;
use std::collections::btree_map;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reserved key under which generators store proposal identifiers.
///
/// Shared by every generator so orchestration code can correlate proposals
/// and results without knowing which algorithm produced them.
pub const ID_KEY: &str = "_id";

/// Annotation key set to `true` on points that [`report_updates`] surfaces as
/// the best point found so far.
///
/// [`report_updates`]: crate::generator::Generator::report_updates
pub const OPTIMUM_KEY: &str = "_optimum";

/// A single field value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum Scalar {
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A text value, typically a discrete category.
    Text(String),
}

impl Scalar {
    /// Returns the value as `f64` for numeric variants.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float(v) => Some(*v),
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Bool(_) | Scalar::Text(_) => None,
        }
    }

    /// Returns the value as `i64` for the `Int` variant.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `true` for `Float` and `Int`.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Float(_) | Scalar::Int(_))
    }
}

impl core::fmt::Display for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(i64::from(v))
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

/// An ordered, schema-driven record of named scalar fields.
///
/// The field set varies per problem schema, so points are maps rather than
/// structs. Iteration order is lexicographic by field name.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Point {
    fields: BTreeMap<String, Scalar>,
}

impl Point {
    /// Creates an empty point.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.fields.insert(name.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields.get(name)
    }

    /// Returns a numeric field as `f64`.
    ///
    /// Returns `None` if the field is absent or not numeric.
    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(Scalar::as_f64)
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Scalar> {
        self.fields.remove(name)
    }

    /// Returns `true` if the field is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the generator-assigned identifier, if the point carries one.
    ///
    /// A non-integer or negative value under [`ID_KEY`] is not an identifier
    /// and yields `None`; use [`has_id_key`](Self::has_id_key) to tell the
    /// two cases apart.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.fields
            .get(ID_KEY)
            .and_then(Scalar::as_i64)
            .and_then(|v| u64::try_from(v).ok())
    }

    /// Returns `true` if the reserved identifier key is present, whatever its value.
    #[must_use]
    pub fn has_id_key(&self) -> bool {
        self.fields.contains_key(ID_KEY)
    }

    /// Stores `id` under [`ID_KEY`].
    ///
    /// # Panics
    ///
    /// Panics if `id` exceeds `i64::MAX`, which a generator would need
    /// more than nine quintillion proposals to reach.
    pub fn set_id(&mut self, id: u64) {
        let value = i64::try_from(id).expect("identifier exceeds i64::MAX");
        self.fields.insert(ID_KEY.to_owned(), Scalar::Int(value));
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the point has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Scalar> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a Point {
    type Item = (&'a String, &'a Scalar);
    type IntoIter = btree_map::Iter<'a, String, Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Point {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Scalar>, const N: usize> From<[(K, V); N]> for Point {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}
