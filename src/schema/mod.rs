//! Problem schemas: the validated namespace of an optimization problem.
//!
//! A [`ProblemSchema`] declares five pairwise disjoint namespaces:
//!
//! | Namespace | Holds | Required |
//! |-----------|-------|----------|
//! | variables | [`Variable`] domains the generator populates | yes |
//! | objectives | a [`Direction`] per optimized output | yes |
//! | constants | fixed [`Scalar`] values merged into every proposal | no |
//! | constraints | a [`Constraint`] per constrained output | no |
//! | observables | names of recorded-but-not-optimized outputs | no |
//!
//! Schemas are built through [`ProblemSchema::builder`] and are immutable once
//! built.
//!
//! # Examples
//!
//! ```
//! use optgen::schema::{Constraint, ProblemSchema, Role};
//! use optgen::Direction;
//!
//! let schema = ProblemSchema::builder()
//!     .variable("x", 0.0, 10.0)
//!     .variable("y", -5.0, 5.0)
//!     .objective("f", Direction::Minimize)
//!     .constraint("c", Constraint::GreaterThan(5.5))
//!     .constant("alpha", 1.0)
//!     .observable("temp")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.n_inputs(), 3);
//! assert_eq!(schema.role("c"), Some(Role::Constraint));
//! assert_eq!(schema.output_names(), vec!["f", "c", "temp"]);
//! ```

mod constraint;
#[cfg(feature = "serde")]
mod serde_def;
mod variable;

use std::collections::{BTreeMap, BTreeSet};

pub use constraint::{Constraint, EQUALITY_TOLERANCE};
pub use variable::Variable;

use crate::error::{Error, Result};
use crate::point::{ID_KEY, OPTIMUM_KEY, Point, Scalar};
use crate::types::Direction;

/// The namespace a field name belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// An input the generator chooses.
    Variable,
    /// An input fixed by the schema.
    Constant,
    /// An output to optimize.
    Objective,
    /// An output that must satisfy a comparison.
    Constraint,
    /// An output recorded alongside the others.
    Observable,
}

impl Role {
    fn namespace(self) -> &'static str {
        match self {
            Role::Variable => "variables",
            Role::Constant => "constants",
            Role::Objective => "objectives",
            Role::Constraint => "constraints",
            Role::Observable => "observables",
        }
    }
}

/// An immutable, validated declaration of an optimization problem.
///
/// Names within each namespace are kept in lexicographic order, which is
/// also the dimension order generators use for continuous variables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "serde_def::SchemaDef", into = "serde_def::SchemaDef")
)]
pub struct ProblemSchema {
    variables: BTreeMap<String, Variable>,
    objectives: BTreeMap<String, Direction>,
    constants: BTreeMap<String, Scalar>,
    constraints: BTreeMap<String, Constraint>,
    observables: BTreeSet<String>,
}

impl ProblemSchema {
    /// Returns a [`ProblemSchemaBuilder`] for declaring a schema field by field.
    #[must_use]
    pub fn builder() -> ProblemSchemaBuilder {
        ProblemSchemaBuilder::default()
    }

    /// Builds a schema with only variables and objectives.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaValidation`] under the same rules as
    /// [`ProblemSchemaBuilder::build`].
    ///
    /// # Examples
    ///
    /// ```
    /// use optgen::schema::{ProblemSchema, Variable};
    /// use optgen::Direction;
    ///
    /// let schema = ProblemSchema::new(
    ///     [("x", Variable::continuous(0.0, 1.0))],
    ///     [("f", Direction::Minimize)],
    /// )
    /// .unwrap();
    /// assert_eq!(schema.variable_names(), vec!["x"]);
    /// ```
    pub fn new<V, O, K1, K2>(variables: V, objectives: O) -> Result<Self>
    where
        V: IntoIterator<Item = (K1, Variable)>,
        O: IntoIterator<Item = (K2, Direction)>,
        K1: Into<String>,
        K2: Into<String>,
    {
        let mut builder = Self::builder();
        for (name, variable) in variables {
            builder = builder.variable_domain(name, variable);
        }
        for (name, direction) in objectives {
            builder = builder.objective(name, direction);
        }
        builder.build()
    }

    /// Reports which namespace owns `name`, if any.
    #[must_use]
    pub fn role(&self, name: &str) -> Option<Role> {
        if self.variables.contains_key(name) {
            Some(Role::Variable)
        } else if self.constants.contains_key(name) {
            Some(Role::Constant)
        } else if self.objectives.contains_key(name) {
            Some(Role::Objective)
        } else if self.constraints.contains_key(name) {
            Some(Role::Constraint)
        } else if self.observables.contains(name) {
            Some(Role::Observable)
        } else {
            None
        }
    }

    /// Returns `true` if any namespace declares `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.role(name).is_some()
    }

    /// The declared variables.
    #[must_use]
    pub fn variables(&self) -> &BTreeMap<String, Variable> {
        &self.variables
    }

    /// The declared objectives.
    #[must_use]
    pub fn objectives(&self) -> &BTreeMap<String, Direction> {
        &self.objectives
    }

    /// The declared constants.
    #[must_use]
    pub fn constants(&self) -> &BTreeMap<String, Scalar> {
        &self.constants
    }

    /// The declared constraints.
    #[must_use]
    pub fn constraints(&self) -> &BTreeMap<String, Constraint> {
        &self.constraints
    }

    /// The declared observables.
    #[must_use]
    pub fn observables(&self) -> &BTreeSet<String> {
        &self.observables
    }

    #[must_use]
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn constant_names(&self) -> Vec<&str> {
        self.constants.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn objective_names(&self) -> Vec<&str> {
        self.objectives.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn constraint_names(&self) -> Vec<&str> {
        self.constraints.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn observable_names(&self) -> Vec<&str> {
        self.observables.iter().map(String::as_str).collect()
    }

    /// Objectives, then constraints, then observables.
    #[must_use]
    pub fn output_names(&self) -> Vec<&str> {
        self.objectives
            .keys()
            .chain(self.constraints.keys())
            .chain(self.observables.iter())
            .map(String::as_str)
            .collect()
    }

    /// Variables, then constants, then outputs.
    #[must_use]
    pub fn all_names(&self) -> Vec<&str> {
        let mut names = self.variable_names();
        names.extend(self.constant_names());
        names.extend(self.output_names());
        names
    }

    #[must_use]
    pub fn n_variables(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn n_constants(&self) -> usize {
        self.constants.len()
    }

    #[must_use]
    pub fn n_inputs(&self) -> usize {
        self.n_variables() + self.n_constants()
    }

    #[must_use]
    pub fn n_objectives(&self) -> usize {
        self.objectives.len()
    }

    #[must_use]
    pub fn n_constraints(&self) -> usize {
        self.constraints.len()
    }

    #[must_use]
    pub fn n_observables(&self) -> usize {
        self.observables.len()
    }

    #[must_use]
    pub fn n_outputs(&self) -> usize {
        self.n_objectives() + self.n_constraints() + self.n_observables()
    }

    /// `(low, high)` for every continuous variable, in variable order.
    #[must_use]
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.variables.values().filter_map(Variable::bounds).collect()
    }

    /// Returns `true` if every declared constraint is present, numeric, and satisfied.
    #[must_use]
    pub fn is_feasible(&self, point: &Point) -> bool {
        self.constraints
            .iter()
            .all(|(name, c)| point.get_f64(name).is_some_and(|v| c.check(v)))
    }

    /// Sum of constraint violations; a missing or non-numeric constraint
    /// value counts as infinitely violated.
    #[must_use]
    pub fn total_violation(&self, point: &Point) -> f64 {
        self.constraints
            .iter()
            .map(|(name, c)| point.get_f64(name).map_or(f64::INFINITY, |v| c.violation(v)))
            .sum()
    }

    /// A point holding every constant at its declared value.
    #[must_use]
    pub fn constant_point(&self) -> Point {
        self.constants
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Collects schema entries and validates them all at once in [`build`](Self::build).
///
/// Entries are only checked when `build` is called, so the order of calls
/// does not matter and no partially valid schema is ever observable.
#[derive(Clone, Debug, Default)]
pub struct ProblemSchemaBuilder {
    variables: Vec<(String, Variable)>,
    objectives: Vec<(String, Direction)>,
    constants: Vec<(String, Scalar)>,
    constraints: Vec<(String, Constraint)>,
    observables: Vec<String>,
}

impl ProblemSchemaBuilder {
    /// Declares a continuous variable over `[low, high]`.
    #[must_use]
    pub fn variable(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.variable_domain(name, Variable::continuous(low, high))
    }

    /// Declares a continuous variable with a preferred starting value.
    #[must_use]
    pub fn variable_with_default(
        self,
        name: impl Into<String>,
        low: f64,
        high: f64,
        default_value: f64,
    ) -> Self {
        self.variable_domain(
            name,
            Variable::Continuous {
                low,
                high,
                default_value: Some(default_value),
            },
        )
    }

    /// Declares a discrete variable over `values`.
    #[must_use]
    pub fn discrete_variable<I, V>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        self.variable_domain(name, Variable::discrete(values))
    }

    /// Declares a variable with an explicit domain.
    #[must_use]
    pub fn variable_domain(mut self, name: impl Into<String>, variable: Variable) -> Self {
        self.variables.push((name.into(), variable));
        self
    }

    #[must_use]
    pub fn objective(mut self, name: impl Into<String>, direction: Direction) -> Self {
        self.objectives.push((name.into(), direction));
        self
    }

    #[must_use]
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.constants.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn constraint(mut self, name: impl Into<String>, constraint: Constraint) -> Self {
        self.constraints.push((name.into(), constraint));
        self
    }

    #[must_use]
    pub fn observable(mut self, name: impl Into<String>) -> Self {
        self.observables.push(name.into());
        self
    }

    /// Validates every entry and builds the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaValidation`] naming the offending field when:
    /// - there are no variables or no objectives,
    /// - a name is empty or uses a reserved key (`_id`, `_optimum`),
    /// - a name is declared twice, in one namespace or across two,
    /// - a continuous domain is not a finite interval with `low <= high`,
    /// - a discrete domain is empty,
    /// - a constant is a non-finite float,
    /// - a constraint threshold is not finite or its bounds are not ascending.
    pub fn build(self) -> Result<ProblemSchema> {
        if self.variables.is_empty() {
            return Err(Error::schema(
                "variables",
                "at least one variable must be declared",
            ));
        }
        if self.objectives.is_empty() {
            return Err(Error::schema(
                "objectives",
                "at least one objective must be declared",
            ));
        }

        let mut claimed: BTreeMap<&str, Role> = BTreeMap::new();
        let names = self
            .variables
            .iter()
            .map(|(n, _)| (n, Role::Variable))
            .chain(self.constants.iter().map(|(n, _)| (n, Role::Constant)))
            .chain(self.objectives.iter().map(|(n, _)| (n, Role::Objective)))
            .chain(self.constraints.iter().map(|(n, _)| (n, Role::Constraint)))
            .chain(self.observables.iter().map(|n| (n, Role::Observable)));
        for (name, role) in names {
            if name.is_empty() {
                return Err(Error::schema(
                    role.namespace(),
                    "names must be non-empty strings",
                ));
            }
            if name == ID_KEY || name == OPTIMUM_KEY {
                return Err(Error::schema(name.as_str(), "name is reserved"));
            }
            if let Some(previous) = claimed.insert(name.as_str(), role) {
                let reason = if previous == role {
                    format!("declared twice in {}", role.namespace())
                } else {
                    format!(
                        "declared in both {} and {}",
                        previous.namespace(),
                        role.namespace()
                    )
                };
                return Err(Error::schema(name.as_str(), reason));
            }
        }

        if let Some((name, value)) = self
            .constants
            .iter()
            .find(|(_, v)| matches!(v, Scalar::Float(f) if !f.is_finite()))
        {
            return Err(Error::schema(
                name.as_str(),
                format!("constant value {value} must be finite"),
            ));
        }

        let variables = self
            .variables
            .into_iter()
            .map(|(name, var)| var.validated(&name).map(|var| (name, var)))
            .collect::<Result<_>>()?;
        let constraints = self
            .constraints
            .into_iter()
            .map(|(name, c)| c.validated(&name).map(|c| (name, c)))
            .collect::<Result<_>>()?;

        Ok(ProblemSchema {
            variables,
            objectives: self.objectives.into_iter().collect(),
            constants: self.constants.into_iter().collect(),
            constraints,
            observables: self.observables.into_iter().collect(),
        })
    }
}
