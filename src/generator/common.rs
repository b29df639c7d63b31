//! Validation and bookkeeping shared by every generator.

use crate::error::{Error, Result};
use crate::point::{Point, Scalar};
use crate::schema::{ProblemSchema, Variable};
use crate::types::{Direction, GeneratorState};

use super::IdLedger;

/// Which optional outputs a generator insists on during ingestion.
///
/// Variables and objectives are always required. The reference generators
/// require constraints and observables too ([`FieldPolicy::STRICT`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldPolicy {
    /// Every declared constraint must be present and numeric.
    pub require_constraints: bool,
    /// Every declared observable must be present.
    pub require_observables: bool,
}

impl FieldPolicy {
    /// Constraints and observables are as mandatory as objectives.
    pub const STRICT: FieldPolicy = FieldPolicy {
        require_constraints: true,
        require_observables: true,
    };

    /// Only variables and objectives are mandatory.
    pub const OBJECTIVES_ONLY: FieldPolicy = FieldPolicy {
        require_constraints: false,
        require_observables: false,
    };
}

impl Default for FieldPolicy {
    fn default() -> Self {
        Self::STRICT
    }
}

fn require_numeric(point: &Point, index: usize, field: &str, kind: &str) -> Result<()> {
    match point.get(field) {
        None => Err(Error::MissingField {
            index,
            field: field.to_owned(),
        }),
        Some(value) if !value.is_numeric() => Err(Error::InvalidField {
            index,
            field: field.to_owned(),
            reason: format!("{kind} values must be numeric, got '{value}'"),
        }),
        Some(_) => Ok(()),
    }
}

/// Validates a batch of results against `schema`, `policy`, and the
/// outstanding identifiers in `ledger`, without changing anything.
///
/// Field checks run over the whole batch first, then identifier checks.
/// Every point must echo every variable, whether or not it carries an
/// identifier.
///
/// # Errors
///
/// - [`Error::MissingField`] for the first point lacking a variable or a
///   required output.
/// - [`Error::InvalidField`] for the first point whose objective or
///   constraint value is not numeric.
/// - [`Error::UnknownIdentifier`] listing every point whose identifier is
///   not outstanding or repeats within the batch.
pub fn validate_results(
    schema: &ProblemSchema,
    points: &[Point],
    policy: FieldPolicy,
    ledger: &IdLedger,
) -> Result<()> {
    for (index, point) in points.iter().enumerate() {
        if let Some(name) = schema.variables().keys().find(|n| !point.contains(n)) {
            return Err(Error::MissingField {
                index,
                field: name.clone(),
            });
        }
        for name in schema.objectives().keys() {
            require_numeric(point, index, name, "objective")?;
        }
        if policy.require_constraints {
            for name in schema.constraints().keys() {
                require_numeric(point, index, name, "constraint")?;
            }
        }
        if policy.require_observables
            && let Some(name) = schema.observables().iter().find(|n| !point.contains(n))
        {
            return Err(Error::MissingField {
                index,
                field: name.clone(),
            });
        }
    }
    ledger.check_batch(points)
}

/// Tracks a generator's position in the protocol state machine.
#[derive(Clone, Copy, Debug)]
pub struct Lifecycle {
    state: GeneratorState,
}

impl Lifecycle {
    /// A lifecycle in the `Ready` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: GeneratorState::Ready,
        }
    }

    #[must_use]
    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Fails if the generator has been finalized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalState`] once finalized.
    pub fn ensure_live(&self) -> Result<()> {
        if self.state == GeneratorState::Finalized {
            Err(Error::TerminalState)
        } else {
            Ok(())
        }
    }

    /// Enters a transient state for the duration of a call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalState`] once finalized.
    pub fn begin(&mut self, state: GeneratorState) -> Result<()> {
        self.ensure_live()?;
        self.state = state;
        Ok(())
    }

    /// Returns to `Ready` at the end of a call.
    pub fn end(&mut self) {
        if self.state != GeneratorState::Finalized {
            self.state = GeneratorState::Ready;
        }
    }

    /// Enters the terminal state.
    pub fn finish(&mut self) {
        self.state = GeneratorState::Finalized;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates a requested proposal size against the current capacity.
pub(crate) fn check_count(count: usize, capacity: Option<usize>) -> Result<()> {
    if count == 0 {
        return Err(Error::InvalidCount);
    }
    match capacity {
        Some(available) if count > available => Err(Error::Capacity {
            requested: count,
            available,
        }),
        _ => Ok(()),
    }
}

/// How well a result did, in a form every algorithm can compare.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Fitness {
    /// Objective value mapped so that lower is better; NaN becomes +inf.
    pub(crate) loss: f64,
    /// Total constraint violation.
    pub(crate) violation: f64,
    pub(crate) feasible: bool,
}

impl Fitness {
    pub(crate) fn evaluate(
        schema: &ProblemSchema,
        objective: &str,
        direction: Direction,
        point: &Point,
    ) -> Self {
        let loss = point
            .get_f64(objective)
            .map_or(f64::INFINITY, |v| direction.to_loss(v));
        let loss = if loss.is_nan() { f64::INFINITY } else { loss };
        Self {
            loss,
            violation: schema.total_violation(point),
            feasible: schema.is_feasible(point),
        }
    }

    /// Feasibility rules: feasible beats infeasible, feasible pairs compare
    /// by loss, infeasible pairs by violation then loss. Ties go to `self`.
    #[allow(clippy::float_cmp)]
    pub(crate) fn beats(&self, other: &Fitness) -> bool {
        match (self.feasible, other.feasible) {
            (true, true) => self.loss <= other.loss,
            (true, false) => true,
            (false, true) => false,
            (false, false) => {
                if self.violation == other.violation {
                    self.loss <= other.loss
                } else {
                    self.violation < other.violation
                }
            }
        }
    }
}

/// The best result seen so far.
#[derive(Clone, Debug, Default)]
pub(crate) struct Incumbent {
    best: Option<(Point, Fitness)>,
}

impl Incumbent {
    /// Offers a candidate; returns `true` if it strictly replaced the incumbent.
    pub(crate) fn offer(&mut self, point: &Point, fitness: Fitness) -> bool {
        let improved = match &self.best {
            None => true,
            Some((_, current)) => fitness.beats(current) && !current.beats(&fitness),
        };
        if improved {
            self.best = Some((point.clone(), fitness));
        }
        improved
    }

    pub(crate) fn point(&self) -> Option<&Point> {
        self.best.as_ref().map(|(p, _)| p)
    }
}

/// The first objective with a preferred direction, if any.
pub(crate) fn primary_objective(schema: &ProblemSchema) -> Option<(String, Direction)> {
    schema
        .objectives()
        .iter()
        .find(|(_, d)| **d != Direction::Explore)
        .map(|(n, d)| (n.clone(), *d))
}

/// `(low, high)` per variable, for schemas whose variables are all continuous.
pub(crate) fn continuous_bounds(schema: &ProblemSchema) -> Result<Vec<(f64, f64)>> {
    schema
        .variables()
        .values()
        .map(|v| {
            v.bounds()
                .ok_or(Error::Internal("continuous generator built on a discrete variable"))
        })
        .collect()
}

/// Builds a proposal from a continuous vector in variable order, merging
/// the schema's constants.
pub(crate) fn point_from_vector(schema: &ProblemSchema, x: &[f64], id: u64) -> Point {
    let mut point = schema.constant_point();
    for (name, value) in schema.variables().keys().zip(x) {
        point.insert(name.clone(), *value);
    }
    point.set_id(id);
    point
}

/// Builds a proposal from explicit per-variable values, merging constants.
pub(crate) fn point_from_values(
    schema: &ProblemSchema,
    values: impl IntoIterator<Item = (String, Scalar)>,
    id: u64,
) -> Point {
    let mut point = schema.constant_point();
    for (name, value) in values {
        point.insert(name, value);
    }
    point.set_id(id);
    point
}

/// Clamps each coordinate into its domain.
pub(crate) fn clamp_to_bounds(x: &mut [f64], bounds: &[(f64, f64)]) {
    for (v, (lo, hi)) in x.iter_mut().zip(bounds) {
        *v = v.clamp(*lo, *hi);
    }
}

/// Starting vector: each variable's default value, else its domain midpoint.
pub(crate) fn default_vector(schema: &ProblemSchema) -> Vec<f64> {
    schema
        .variables()
        .values()
        .filter_map(|v| match v {
            Variable::Continuous {
                low,
                high,
                default_value,
            } => Some(default_value.unwrap_or(0.5 * (low + high))),
            Variable::Discrete { .. } => None,
        })
        .collect()
}
