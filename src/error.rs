#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Returned when a problem schema violates a namespace, domain, or
    /// enumeration rule.
    #[error("invalid schema field '{field}': {reason}")]
    SchemaValidation {
        /// The offending field name (or namespace, when the field itself is missing).
        field: String,
        /// The violated rule.
        reason: String,
    },

    /// Returned when a generator is built against a schema declaring a feature
    /// the algorithm cannot honor.
    #[error("{generator} does not support {feature}")]
    SchemaCompatibility {
        /// Name of the generator that rejected the schema.
        generator: &'static str,
        /// The unsupported schema feature.
        feature: String,
    },

    /// Returned when `propose` asks for more points than the generator can supply.
    #[error("requested {requested} points but only {available} can be supplied")]
    Capacity {
        /// The number of points requested.
        requested: usize,
        /// The number of points the generator could supply right now.
        available: usize,
    },

    /// Returned when `propose` is called with a count of zero.
    #[error("point count must be positive")]
    InvalidCount,

    /// Returned when an ingested point lacks a required field.
    #[error("point {index} is missing required field '{field}'")]
    MissingField {
        /// Position of the point in the ingested batch.
        index: usize,
        /// The missing field.
        field: String,
    },

    /// Returned when an ingested field is present but unusable.
    #[error("point {index} has invalid field '{field}': {reason}")]
    InvalidField {
        /// Position of the point in the ingested batch.
        index: usize,
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Returned when ingested points carry identifiers this generator never
    /// issued or has already resolved.
    #[error("unknown identifiers at batch positions {indices:?}")]
    UnknownIdentifier {
        /// Positions of every rejected point in the batch.
        indices: Vec<usize>,
    },

    /// Returned when any protocol operation is invoked after `finalize`.
    #[error("generator has been finalized")]
    TerminalState,

    /// Returned when algorithm configuration is out of range.
    #[error("invalid configuration for '{option}': {reason}")]
    InvalidConfig {
        /// The configuration option.
        option: &'static str,
        /// The violated rule.
        reason: String,
    },

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl Error {
    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            option,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
