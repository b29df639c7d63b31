//! The generator protocol and its reference implementations.
//!
//! A [`Generator`] proposes candidate points for a [`ProblemSchema`] and
//! absorbs evaluated results to refine later proposals. Every generator
//! follows the same lifecycle:
//!
//! ```text
//! Uninitialized --build--> Ready <--> {Proposing, Ingesting} --finalize--> Finalized
//! ```
//!
//! `Proposing` and `Ingesting` only last for the duration of one call;
//! `&mut self` on every mutating operation keeps calls sequential.
//!
//! # Identifier correlation
//!
//! Proposals carry a generator-assigned identifier under [`ID_KEY`](crate::ID_KEY). The
//! generator keeps every issued, unresolved identifier in its outstanding
//! set; feeding a result back with that identifier resolves it. Results
//! without an identifier are accepted as externally originated data.
//!
//! # Ingest policy
//!
//! All reference generators validate a whole batch before touching their
//! state and reject the **entire batch** on the first class of failure:
//! a missing variable (results echo every variable, identified or not),
//! missing or non-numeric objectives, constraints, or observables
//! ([`Error::MissingField`], [`Error::InvalidField`]) and identifiers that are
//! not outstanding ([`Error::UnknownIdentifier`], listing every offending
//! position). A rejected call leaves the generator exactly as it was.
//!
//! # Reference generators
//!
//! | Generator | Method | Natural batch | Schema support |
//! |-----------|--------|---------------|----------------|
//! | [`RandomGenerator`] | Uniform random | configured `batch_size` | everything |
//! | [`NelderMeadGenerator`] | Ask/tell simplex | unevaluated points of the current step | one objective, continuous, unconstrained |
//! | [`DifferentialEvolutionGenerator`] | DE with feasibility rules | unevaluated members of the generation | one objective, continuous |
//!
//! # Examples
//!
//! ```
//! use optgen::prelude::*;
//!
//! let schema = ProblemSchema::builder()
//!     .variable("x", 0.0, 1.0)
//!     .objective("f", Direction::Minimize)
//!     .build()?;
//! let mut generator = RandomGenerator::with_seed(schema, 42)?;
//!
//! let mut points = generator.propose(Some(3))?;
//! assert_eq!(points.len(), 3);
//! for point in &mut points {
//!     let x = point.get_f64("x").unwrap();
//!     point.insert("f", x * x);
//! }
//! generator.ingest(&points)?;
//! assert!(generator.outstanding().is_empty());
//!
//! let summary = generator.finalize(None)?;
//! assert_eq!(summary.map(|h| h.len()), Some(3));
//! # Ok::<(), optgen::Error>(())
//! ```

pub mod de;
mod common;
mod ledger;
pub mod nelder_mead;
pub mod random;

pub use common::{FieldPolicy, Lifecycle, validate_results};
pub use de::{DifferentialEvolutionGenerator, DifferentialEvolutionStrategy};
pub use ledger::IdLedger;
pub use nelder_mead::NelderMeadGenerator;
pub use random::RandomGenerator;

use crate::error::{Error, Result};
use crate::point::Point;
use crate::schema::ProblemSchema;
use crate::types::{Direction, GeneratorState};

/// Schema features a generator can honor.
///
/// Checked once at construction by [`check_compatibility`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Accepts schemas declaring constraints.
    pub constraints: bool,
    /// Accepts schemas with more than one objective.
    pub multiple_objectives: bool,
    /// Accepts [`Direction::Explore`] objectives.
    pub explore_objectives: bool,
    /// Accepts discrete variables.
    pub discrete_variables: bool,
    /// Implements [`Generator::report_updates`] with real content.
    pub updates: bool,
}

impl Capabilities {
    /// A generator that handles every schema feature and reports updates.
    pub const ALL: Capabilities = Capabilities {
        constraints: true,
        multiple_objectives: true,
        explore_objectives: true,
        discrete_variables: true,
        updates: true,
    };

    /// A single-objective optimizer over unconstrained continuous spaces.
    pub const CONTINUOUS_SINGLE_OBJECTIVE: Capabilities = Capabilities {
        constraints: false,
        multiple_objectives: false,
        explore_objectives: false,
        discrete_variables: false,
        updates: false,
    };
}

/// Rejects schemas that declare a feature `capabilities` does not cover.
///
/// # Errors
///
/// Returns [`Error::SchemaCompatibility`] naming the first unsupported feature.
pub fn check_compatibility(
    generator: &'static str,
    schema: &ProblemSchema,
    capabilities: Capabilities,
) -> Result<()> {
    let reject = |feature: String| Err(Error::SchemaCompatibility { generator, feature });

    if !capabilities.constraints && schema.n_constraints() > 0 {
        return reject("constraints".into());
    }
    if !capabilities.multiple_objectives && schema.n_objectives() > 1 {
        return reject(format!("{} objectives", schema.n_objectives()));
    }
    if !capabilities.explore_objectives
        && let Some((name, _)) = schema
            .objectives()
            .iter()
            .find(|(_, d)| **d == Direction::Explore)
    {
        return reject(format!("EXPLORE objective '{name}'"));
    }
    if !capabilities.discrete_variables
        && let Some((name, _)) = schema.variables().iter().find(|(_, v)| !v.is_continuous())
    {
        return reject(format!("discrete variable '{name}'"));
    }
    Ok(())
}

/// The operational protocol shared by every optimization generator.
///
/// Implementations are polymorphic over algorithm; orchestration code can
/// drive any of them through `&mut dyn Generator`.
pub trait Generator: Send {
    /// A short, stable name for error messages and logs.
    fn name(&self) -> &'static str;

    /// The schema this generator was built against.
    fn schema(&self) -> &ProblemSchema;

    /// The schema features this generator honors.
    fn capabilities(&self) -> Capabilities;

    /// The current lifecycle state.
    fn state(&self) -> GeneratorState;

    /// Identifiers issued by [`propose`](Self::propose) and not yet resolved,
    /// in ascending order.
    fn outstanding(&self) -> Vec<u64>;

    /// The largest `count` [`propose`](Self::propose) would accept right now,
    /// or `None` if there is no limit.
    fn capacity(&self) -> Option<usize>;

    /// Proposes points to evaluate.
    ///
    /// With `Some(count)` exactly `count` points are returned; with `None`
    /// the generator returns its natural batch. Every point holds a value for
    /// each variable, each constant at its declared value, and an identifier
    /// under [`ID_KEY`](crate::ID_KEY).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCount`] for `Some(0)`.
    /// - [`Error::Capacity`] if `count` exceeds [`capacity`](Self::capacity);
    ///   nothing is issued.
    /// - [`Error::TerminalState`] after [`finalize`](Self::finalize).
    fn propose(&mut self, count: Option<usize>) -> Result<Vec<Point>>;

    /// Feeds evaluated results back into the generator.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingField`] / [`Error::InvalidField`] for a result lacking a
    ///   usable objective, constraint, or observable value.
    /// - [`Error::UnknownIdentifier`] for identifiers that are not outstanding.
    /// - [`Error::TerminalState`] after [`finalize`](Self::finalize).
    ///
    /// On error the generator is left unchanged.
    fn ingest(&mut self, points: &[Point]) -> Result<()>;

    /// Whether [`report_updates`](Self::report_updates) can return anything.
    fn supports_updates(&self) -> bool {
        self.capabilities().updates
    }

    /// Returns revisions to previously proposed points since the last call.
    ///
    /// Every returned point carries its original identifier. An empty vector
    /// means there is nothing new; it is never an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalState`] after [`finalize`](Self::finalize).
    fn report_updates(&mut self) -> Result<Vec<Point>> {
        if self.state() == GeneratorState::Finalized {
            return Err(Error::TerminalState);
        }
        Ok(Vec::new())
    }

    /// Ingests an optional last batch and shuts the generator down.
    ///
    /// Returns the generator's closing summary, if it has one.
    ///
    /// # Errors
    ///
    /// - Any [`ingest`](Self::ingest) error for the final batch; the generator
    ///   then stays `Ready`.
    /// - [`Error::TerminalState`] if already finalized.
    fn finalize(&mut self, points: Option<&[Point]>) -> Result<Option<Vec<Point>>>;
}
